use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use ndarray::{Array2, Ix2};

use crate::config::KitConfig;
use crate::errors::{KitError, KitResult};
use crate::io::npy::{read_npy, write_npy};
use crate::mask::{predictions_from_array, rgb_preview, scale_to_u8, to_label, MaskArray};
use crate::metrics::{score_change_map, score_classes, MetricsReport};
use crate::patch::{reconstruct_mask, PatchLayout};
use crate::raster::{extract_pair, BandReader, Scene, SceneLoader, ScenePair};
use crate::utils::progress::ProgressTracker;

/// Main interface to the changekit library
///
/// Owns the run configuration and strings the scene loader, patch core,
/// mask output and metrics together into the four user-facing operations.
pub struct ChangeKit {
    config: KitConfig,
}

impl ChangeKit {
    /// Create a new ChangeKit instance
    ///
    /// # Arguments
    /// * `config` - Run configuration, validated here
    ///
    /// # Returns
    /// A ChangeKit instance or a `Config` error
    pub fn new(config: KitConfig) -> KitResult<Self> {
        config.validate()?;
        Ok(ChangeKit { config })
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    fn loader(&self) -> SceneLoader {
        SceneLoader::new(self.config.template_band)
    }

    /// Load both acquisitions of a city
    ///
    /// # Arguments
    /// * `city_dir` - Directory holding the two date directories
    ///
    /// # Returns
    /// The scene pair, both dates at the size of the first date's template
    /// band and checked for matching depth
    pub fn load_pair(&self, city_dir: &Path) -> KitResult<ScenePair> {
        let loader = self.loader();
        let [first_dir, second_dir] = self.config.date_dirs();
        let progress = ProgressTracker::new(2, "Loading scenes");

        progress.set_message(&format!("Loading {}", first_dir));
        let first = loader.load(&city_dir.join(first_dir))?;
        progress.increment(1);

        progress.set_message(&format!("Loading {}", second_dir));
        let second = loader.load_to_size(&city_dir.join(second_dir), (first.height(), first.width()))?;
        progress.increment(1);
        progress.finish();

        ScenePair::from_scenes(first, second)
    }

    /// Summarise the bands, scene shape and patch layout of a city
    ///
    /// # Arguments
    /// * `city_dir` - Directory holding the two date directories
    ///
    /// # Returns
    /// A multi-line, human-readable summary
    pub fn analyze(&self, city_dir: &Path) -> KitResult<String> {
        let pair = self.load_pair(city_dir)?;
        let mut result = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(result, "Change Analysis Results: {}", city_dir.display());
        for (label, scene) in [("Date 1", &pair.first), ("Date 2", &pair.second)] {
            let _ = writeln!(result, "\n{} ({})", label, scene.dir.display());
            let _ = writeln!(result, "  Bands: {}", scene.depth());
            for (i, (id, format)) in scene.band_ids.iter().zip(&scene.formats).enumerate() {
                let marker = if i == self.config.template_band { " (template)" } else { "" };
                let _ = writeln!(result, "    {:>2}: {} [{}]{}", i, id, format, marker);
            }
        }

        let (height, width) = (pair.first.height(), pair.first.width());
        let _ = writeln!(result, "\nScene: {}x{}x{}", height, width, pair.first.depth());

        match PatchLayout::compute(height, width, self.config.patch_size) {
            Ok(layout) => {
                let _ = writeln!(result, "Patch size: {}", layout.patch_size);
                let _ = writeln!(result, "  Grid: {}x{} ({} patches)", layout.hs, layout.ws, layout.grid_count());
                let _ = writeln!(result, "  Last column: {} patches", layout.lc);
                let _ = writeln!(result, "  Last row: {} patches", layout.lr);
                let _ = writeln!(result, "  Total per date: {}", layout.total());
            }
            Err(e) => {
                let _ = writeln!(result, "Patch size {}: {}", self.config.patch_size, e);
            }
        }

        Ok(result)
    }

    /// Describe the TIFF container of a single band file
    pub fn describe_band(&self, path: &Path) -> KitResult<String> {
        let reader = BandReader::open(path)?;
        Ok(format!("{}:\n{}", path.display(), reader.tiff()))
    }

    /// Cut both dates of a city into patches and write them for inference
    ///
    /// Writes `<city>_date1.npy` and `<city>_date2.npy` as `(N, D, p, p)`
    /// `float32` batches, plus the `<city>_layout.toml` sidecar needed to
    /// reconstruct predictions later.
    ///
    /// # Arguments
    /// * `city_dir` - Directory holding the two date directories
    /// * `out_dir` - Output directory, created if missing
    /// * `preview` - Also write `<city>_date{1,2}_rgb.png` previews
    ///
    /// # Returns
    /// The layout shared by both batches
    pub fn export_patches(&self, city_dir: &Path, out_dir: &Path, preview: bool) -> KitResult<PatchLayout> {
        let city = city_name(city_dir);
        let pair = self.load_pair(city_dir)?;

        let patches = extract_pair(&pair, self.config.patch_size)?;
        let layout = *patches.layout();

        fs::create_dir_all(out_dir)?;

        let progress = ProgressTracker::new(2, "Writing patch batches");
        for (n, set) in [(1, &patches.first), (2, &patches.second)] {
            let path = out_dir.join(format!("{}_date{}.npy", city, n));
            write_npy(&path, &set.to_batch()?)?;
            progress.increment(1);
        }
        progress.finish();

        write_layout(&out_dir.join(format!("{}_layout.toml", city)), &layout)?;

        if preview {
            for (n, scene) in [(1, &pair.first), (2, &pair.second)] {
                self.write_preview(scene, &out_dir.join(format!("{}_date{}_rgb.png", city, n)))?;
            }
        }

        info!("Exported {} patches per date for {} to {}", layout.total(), city, out_dir.display());
        Ok(layout)
    }

    fn write_preview(&self, scene: &Scene, path: &Path) -> KitResult<()> {
        match rgb_preview(scene, self.config.rgb_bands) {
            Ok(image) => {
                image.save_with_format(path, image::ImageFormat::Png)?;
                info!("Wrote preview {}", path.display());
            }
            Err(e) => warn!("Skipping preview {}: {}", path.display(), e),
        }
        Ok(())
    }

    /// Rebuild a full-scene mask from per-patch predictions
    ///
    /// # Arguments
    /// * `predictions` - `.npy` of `(N, p, p)` labels or `(N, C, p, p)` scores
    /// * `layout_file` - Sidecar written by `export_patches`
    /// * `out` - PNG receiving the min-max scaled mask
    /// * `array_out` - Optional raw class array, format taken from its extension
    ///
    /// # Returns
    /// The unscaled class mask
    pub fn reconstruct(
        &self,
        predictions: &Path,
        layout_file: &Path,
        out: &Path,
        array_out: Option<&Path>,
    ) -> KitResult<Array2<u8>> {
        let layout = read_layout(layout_file)?;
        let maps = predictions_from_array(read_npy(predictions)?)?;

        let mask = reconstruct_mask(&maps, &layout)?;

        MaskArray::from_array(&scale_to_u8(mask.view())).save_to_file(out, "png")?;

        if let Some(path) = array_out {
            let format = path.extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_else(|| self.config.array_format.clone());
            MaskArray::from_array(&mask).save_to_file(path, &format)?;
        }

        info!("Reconstructed {}x{} mask into {}", layout.height, layout.width, out.display());
        Ok(mask)
    }

    /// Score a predicted change map against a reference change map
    pub fn evaluate(&self, mask_path: &Path, truth_path: &Path) -> KitResult<MetricsReport> {
        let predicted = load_mask(mask_path)?;
        let truth = load_mask(truth_path)?;
        score_change_map(truth.view(), predicted.view())
    }

    /// Score a multi-class land-cover mask against reference labels
    pub fn evaluate_classes(&self, mask_path: &Path, truth_path: &Path) -> KitResult<MetricsReport> {
        let predicted = load_mask(mask_path)?;
        let truth = load_mask(truth_path)?;
        score_classes(truth.view(), predicted.view())
    }
}

/// Name of a city, taken from its directory
fn city_name(city_dir: &Path) -> String {
    city_dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string())
}

/// Loads a mask from an image file or a 2-D `.npy` array
///
/// `.npy` values must be whole numbers in 0..=255. Reconstructed PNGs are
/// min-max scaled, so land-cover scoring should be given the raw class
/// array written alongside them instead.
pub fn load_mask(path: &Path) -> KitResult<Array2<u8>> {
    let is_npy = path.extension().map_or(false, |e| e.eq_ignore_ascii_case("npy"));
    if !is_npy {
        return MaskArray::load(path)?.to_array();
    }

    let values = read_npy(path)?
        .into_dimensionality::<Ix2>()
        .map_err(|e| KitError::Npy(format!("{} is not a 2-D mask: {}", path.display(), e)))?;

    let labels = values.iter()
        .map(|&v| to_label(v))
        .collect::<KitResult<Vec<u8>>>()
        .map_err(|e| match e {
            KitError::Npy(msg) => KitError::Npy(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

    Array2::from_shape_vec(values.raw_dim(), labels)
        .map_err(|e| KitError::Npy(e.to_string()))
}

const LAYOUT_KEYS: [&str; 7] = ["patch_size", "hs", "ws", "lc", "lr", "height", "width"];

/// Writes a layout as a `[layout]` TOML table
pub fn write_layout(path: &Path, layout: &PatchLayout) -> KitResult<()> {
    let values = [layout.patch_size, layout.hs, layout.ws, layout.lc, layout.lr, layout.height, layout.width];

    let mut table = toml::map::Map::new();
    for (key, value) in LAYOUT_KEYS.iter().zip(values) {
        let value = i64::try_from(value)
            .map_err(|_| KitError::Generic(format!("layout.{} too large: {}", key, value)))?;
        table.insert(key.to_string(), toml::Value::Integer(value));
    }

    let mut root = toml::map::Map::new();
    root.insert("layout".to_string(), toml::Value::Table(table));

    fs::write(path, toml::Value::Table(root).to_string())?;
    info!("Wrote layout {} to {}", layout, path.display());
    Ok(())
}

/// Reads a layout sidecar, rejecting tuples that do not describe a tiling
pub fn read_layout(path: &Path) -> KitResult<PatchLayout> {
    let content = fs::read_to_string(path)?;
    let toml_value: toml::Value = content.parse()
        .map_err(|e| KitError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    let table = toml_value.get("layout")
        .and_then(|v| v.as_table())
        .ok_or_else(|| KitError::Config(format!("{} has no [layout] table", path.display())))?;

    let mut values = [0usize; 7];
    for (slot, key) in values.iter_mut().zip(LAYOUT_KEYS) {
        *slot = table.get(key)
            .and_then(|v| v.as_integer())
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| KitError::Config(format!("layout.{} missing or negative", key)))?;
    }

    let [patch_size, hs, ws, lc, lr, height, width] = values;
    Ok(PatchLayout::from_parts(hs, ws, lc, lr, height, width, patch_size)?)
}

/// Default output directory for exported patches
pub fn default_export_dir(city_dir: &Path) -> PathBuf {
    PathBuf::from(format!("{}_patches", city_name(city_dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchError;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("changekit_api_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_layout_sidecar_reads_back() {
        let path = scratch("layout.toml");
        let layout = PatchLayout::compute(130, 77, 32).unwrap();

        write_layout(&path, &layout).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[layout]"));
        assert_eq!(read_layout(&path).unwrap(), layout);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupted_sidecar_is_rejected() {
        let path = scratch("bad_layout.toml");
        fs::write(&path, "[layout]\npatch_size = 64\nhs = 1\nws = 1\nlc = 2\nlr = 1\nheight = 100\nwidth = 100\n").unwrap();
        assert!(matches!(read_layout(&path), Err(KitError::Patch(PatchError::InconsistentLayout(_)))));

        fs::write(&path, "[layout]\npatch_size = 64\n").unwrap();
        assert!(matches!(read_layout(&path), Err(KitError::Config(_))));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_city_names() {
        assert_eq!(city_name(Path::new("/data/images/abudhabi")), "abudhabi");
        assert_eq!(default_export_dir(Path::new("/data/images/lasvegas")), PathBuf::from("lasvegas_patches"));
    }

    #[test]
    fn test_npy_masks_load() {
        let path = scratch("mask.npy");
        let mask = Array2::from_shape_vec((2, 2), vec![0u8, 1, 1, 0]).unwrap();
        write_npy(&path, &mask).unwrap();
        assert_eq!(load_mask(&path).unwrap(), mask);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_npy_mask_values_must_be_labels() {
        for (name, value) in [("high", 300.0f32), ("negative", -1.0), ("fraction", 0.6)] {
            let path = scratch(&format!("bad_{}.npy", name));
            let values = Array2::from_shape_vec((1, 3), vec![0.0f32, 1.0, value]).unwrap();
            write_npy(&path, &values).unwrap();

            assert!(matches!(load_mask(&path), Err(KitError::Npy(_))), "{} accepted", value);
            fs::remove_file(&path).unwrap();
        }

        let path = scratch("float_labels.npy");
        write_npy(&path, &Array2::from_shape_vec((1, 3), vec![0.0f32, 2.0, 255.0]).unwrap()).unwrap();
        assert_eq!(load_mask(&path).unwrap(), Array2::from_shape_vec((1, 3), vec![0u8, 2, 255]).unwrap());
        fs::remove_file(&path).unwrap();
    }
}
