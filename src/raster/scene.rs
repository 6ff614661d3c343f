//! Multi-band scene loading
//!
//! A scene is one acquisition date of a city: a directory of single-band
//! files. Bands come at different resolutions, so each is resampled to the
//! size of a template band before stacking into `(H, W, D)`. Both dates of a
//! pair take their size from the first date's template band.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use log::{debug, info};
use ndarray::{stack, Array2, Array3, Axis};
use std::path::{Path, PathBuf};

use crate::errors::{KitError, KitResult};
use crate::patch::{extract_patches, PatchError, PatchLayout, PatchSet};

use super::band::BandRaster;
use super::discovery::discover_band_files;
use super::sample::SampleFormat;

/// Index into the sorted band list whose size all bands are resampled to
pub const DEFAULT_TEMPLATE_BAND: usize = 2;

/// A band-stacked acquisition
#[derive(Debug, Clone)]
pub struct Scene {
    /// Directory the bands were read from
    pub dir: PathBuf,
    /// Band designators in stacking order
    pub band_ids: Vec<String>,
    /// Stored sample format of each band
    pub formats: Vec<SampleFormat>,
    /// Stacked bands, `(H, W, D)`
    pub data: Array3<f32>,
}

impl Scene {
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn depth(&self) -> usize {
        self.data.dim().2
    }
}

/// Reads a directory of band files into a `Scene`
#[derive(Debug, Clone)]
pub struct SceneLoader {
    template_band: usize,
}

impl Default for SceneLoader {
    fn default() -> Self {
        SceneLoader { template_band: DEFAULT_TEMPLATE_BAND }
    }
}

impl SceneLoader {
    /// Creates a loader using the sorted band at `template_band` as size template
    pub fn new(template_band: usize) -> Self {
        SceneLoader { template_band }
    }

    pub fn template_band(&self) -> usize {
        self.template_band
    }

    /// Discovers, decodes and stacks every band of `dir`
    pub fn load(&self, dir: &Path) -> KitResult<Scene> {
        info!("Loading scene from {}", dir.display());

        let bands = discover_band_files(dir)?
            .iter()
            .map(|path| BandRaster::open(path))
            .collect::<KitResult<Vec<_>>>()?;

        self.stack(dir, bands)
    }

    /// Like `load`, but resamples every band to a fixed `(height, width)`
    pub fn load_to_size(&self, dir: &Path, size: (usize, usize)) -> KitResult<Scene> {
        info!("Loading scene from {} at {}x{}", dir.display(), size.0, size.1);

        let bands = discover_band_files(dir)?
            .iter()
            .map(|path| BandRaster::open(path))
            .collect::<KitResult<Vec<_>>>()?;

        self.stack_to_size(dir, bands, size)
    }

    /// Resamples bands to the template size and stacks them depth-last
    ///
    /// # Arguments
    /// * `dir` - Directory recorded on the scene
    /// * `bands` - Bands in stacking order
    ///
    /// # Returns
    /// The scene, or `BandCountMismatch` if there is no template band
    pub fn stack(&self, dir: &Path, bands: Vec<BandRaster>) -> KitResult<Scene> {
        let template = bands.get(self.template_band).ok_or(PatchError::BandCountMismatch {
            expected: self.template_band + 1,
            actual: bands.len(),
        })?;
        let (height, width) = template.shape();
        debug!("Template band {} ({}) is {}x{}", self.template_band, template.band_id, height, width);

        self.stack_to_size(dir, bands, (height, width))
    }

    /// Resamples bands to `(height, width)` and stacks them depth-last
    pub fn stack_to_size(&self, dir: &Path, bands: Vec<BandRaster>, size: (usize, usize)) -> KitResult<Scene> {
        let (height, width) = size;
        if bands.is_empty() {
            return Err(KitError::NoBandFiles(dir.to_path_buf()));
        }

        let mut planes = Vec::with_capacity(bands.len());
        for band in &bands {
            if band.shape() == (height, width) {
                planes.push(band.data.clone());
            } else {
                debug!("Resampling band {} from {:?} to {}x{}", band.band_id, band.shape(), height, width);
                planes.push(resample_bilinear(&band.data, height, width)?);
            }
        }

        let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
        let data = stack(Axis(2), &views)
            .map_err(|e| KitError::Generic(format!("Cannot stack bands: {}", e)))?;

        info!("Stacked {} bands into {}x{}x{} scene", bands.len(), height, width, bands.len());

        Ok(Scene {
            dir: dir.to_path_buf(),
            band_ids: bands.iter().map(|b| b.band_id.clone()).collect(),
            formats: bands.iter().map(|b| b.format).collect(),
            data,
        })
    }
}

/// Bilinear resampling of one band to `height x width`
pub fn resample_bilinear(band: &Array2<f32>, height: usize, width: usize) -> KitResult<Array2<f32>> {
    let (rows, cols) = band.dim();
    let source: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(cols as u32, rows as u32, band.iter().copied().collect())
            .ok_or_else(|| KitError::Generic(format!("Cannot wrap {}x{} band as image", rows, cols)))?;

    let resized = imageops::resize(&source, width as u32, height as u32, FilterType::Triangle);

    Array2::from_shape_vec((height, width), resized.into_raw())
        .map_err(|e| KitError::Generic(format!("Resampled band has wrong size: {}", e)))
}

/// The two acquisitions of one city
#[derive(Debug, Clone)]
pub struct ScenePair {
    pub first: Scene,
    pub second: Scene,
}

impl ScenePair {
    /// Loads `<city_dir>/<date_dirs[0]>` and `<city_dir>/<date_dirs[1]>`
    ///
    /// The second date is resampled to the size of the first date's
    /// template band, so the pair always shares `(H, W)`.
    pub fn load(loader: &SceneLoader, city_dir: &Path, date_dirs: [&str; 2]) -> KitResult<Self> {
        let first = loader.load(&city_dir.join(date_dirs[0]))?;
        let second = loader.load_to_size(&city_dir.join(date_dirs[1]), (first.height(), first.width()))?;
        Self::from_scenes(first, second)
    }

    /// Pairs two scenes that share depth and size
    pub fn from_scenes(first: Scene, second: Scene) -> KitResult<Self> {
        if first.depth() != second.depth() {
            return Err(PatchError::BandCountMismatch {
                expected: first.depth(),
                actual: second.depth(),
            }.into());
        }

        let first_shape = (first.height(), first.width());
        let second_shape = (second.height(), second.width());
        if first_shape != second_shape {
            return Err(KitError::SceneShapeMismatch { first: first_shape, second: second_shape });
        }

        Ok(ScenePair { first, second })
    }
}

/// Patches cut from both dates of a pair with one shared layout
#[derive(Debug, Clone)]
pub struct PatchPair {
    pub first: PatchSet<f32>,
    pub second: PatchSet<f32>,
}

impl PatchPair {
    pub fn layout(&self) -> &PatchLayout {
        &self.first.layout
    }
}

/// Extracts patches from both dates of a pair
pub fn extract_pair(pair: &ScenePair, patch_size: usize) -> KitResult<PatchPair> {
    let first = extract_patches(pair.first.data.view(), patch_size)?;
    let second = extract_patches(pair.second.data.view(), patch_size)?;

    if first.layout != second.layout {
        return Err(PatchError::InconsistentLayout(format!(
            "date layouts differ: {} vs {}", first.layout, second.layout
        )).into());
    }

    Ok(PatchPair { first, second })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(id: &str, height: usize, width: usize, value: f32) -> BandRaster {
        BandRaster {
            path: PathBuf::from(format!("{}.tif", id)),
            band_id: id.to_string(),
            format: SampleFormat::U16,
            data: Array2::from_elem((height, width), value),
        }
    }

    fn scene(height: usize, width: usize, depth: usize) -> Scene {
        Scene {
            dir: PathBuf::from("scene"),
            band_ids: (0..depth).map(|d| format!("B{:02}", d + 1)).collect(),
            formats: vec![SampleFormat::U16; depth],
            data: Array3::from_shape_fn((height, width, depth), |(r, c, d)| (r + c + d) as f32),
        }
    }

    #[test]
    fn test_stack_resamples_to_template() {
        let bands = vec![
            band("B01", 2, 2, 1.0),
            band("B02", 8, 6, 2.0),
            band("B03", 4, 3, 3.0),
            band("B04", 4, 3, 4.0),
        ];

        let scene = SceneLoader::default().stack(Path::new("d"), bands).unwrap();
        assert_eq!(scene.data.dim(), (4, 3, 4));
        assert_eq!(scene.band_ids, vec!["B01", "B02", "B03", "B04"]);

        // constant bands stay constant through bilinear resampling
        assert!((scene.data[[3, 2, 0]] - 1.0).abs() < 1e-5);
        assert!((scene.data[[0, 0, 1]] - 2.0).abs() < 1e-5);
        assert_eq!(scene.data[[1, 1, 3]], 4.0);
    }

    #[test]
    fn test_missing_template_band() {
        let bands = vec![band("B01", 2, 2, 1.0), band("B02", 2, 2, 1.0)];
        let err = SceneLoader::default().stack(Path::new("d"), bands).unwrap_err();
        assert!(matches!(err, KitError::Patch(PatchError::BandCountMismatch { expected: 3, actual: 2 })));

        let scene = SceneLoader::new(1).stack(Path::new("d"), vec![band("B01", 2, 2, 1.0), band("B02", 3, 3, 1.0)]).unwrap();
        assert_eq!(scene.data.dim(), (3, 3, 2));
    }

    #[test]
    fn test_stack_to_fixed_size() {
        let bands = vec![band("B01", 2, 2, 1.0), band("B02", 10, 8, 2.0)];
        let scene = SceneLoader::default().stack_to_size(Path::new("d"), bands, (5, 4)).unwrap();
        assert_eq!(scene.data.dim(), (5, 4, 2));
        assert!((scene.data[[4, 3, 1]] - 2.0).abs() < 1e-5);

        assert!(matches!(
            SceneLoader::default().stack_to_size(Path::new("d"), Vec::new(), (5, 4)),
            Err(KitError::NoBandFiles(_))
        ));
    }

    #[test]
    fn test_resample_identity_size() {
        let data = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as f32);
        let same = resample_bilinear(&data, 5, 7).unwrap();
        for (a, b) in same.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_pair_shape_checks() {
        assert!(ScenePair::from_scenes(scene(80, 70, 3), scene(80, 70, 3)).is_ok());

        assert!(matches!(
            ScenePair::from_scenes(scene(80, 70, 3), scene(80, 70, 2)),
            Err(KitError::Patch(PatchError::BandCountMismatch { expected: 3, actual: 2 }))
        ));
        assert!(matches!(
            ScenePair::from_scenes(scene(80, 70, 3), scene(70, 80, 3)),
            Err(KitError::SceneShapeMismatch { first: (80, 70), second: (70, 80) })
        ));
    }

    #[test]
    fn test_extract_pair_shares_layout() {
        let pair = ScenePair::from_scenes(scene(100, 100, 13), scene(100, 100, 13)).unwrap();
        let patches = extract_pair(&pair, 64).unwrap();

        assert_eq!(patches.layout().as_tuple(), (1, 1, 1, 1, 100, 100));
        assert_eq!(patches.first.len(), 4);
        assert_eq!(patches.second.len(), 4);
        assert_eq!(patches.second.patches[3].dim(), (64, 64, 13));
    }
}
