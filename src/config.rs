//! Run configuration
//!
//! Settings come from an optional TOML file. Every key has a default, so an
//! empty file (or none at all) is a valid configuration. Command-line flags
//! are applied on top by the caller.
//!
//! ```toml
//! [patch]
//! size = 64
//!
//! [scene]
//! date_dirs = ["imgs_1", "imgs_2"]
//! template_band = 2
//! rgb_bands = [3, 2, 1]
//!
//! [output]
//! array_format = "npy"
//!
//! [logging]
//! file = "changekit.log"
//! level = "info"
//! ```

use log::{debug, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{KitError, KitResult};
use crate::mask::ARRAY_FORMATS;
use crate::raster::DEFAULT_TEMPLATE_BAND;

pub const DEFAULT_PATCH_SIZE: usize = 64;
pub const DEFAULT_DATE_DIRS: [&str; 2] = ["imgs_1", "imgs_2"];
/// Sentinel-2 B04, B03, B02 in sorted band order
pub const DEFAULT_RGB_BANDS: [usize; 3] = [3, 2, 1];
pub const DEFAULT_ARRAY_FORMAT: &str = "npy";

/// Settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct KitConfig {
    /// Side length of the square patches
    pub patch_size: usize,
    /// Sub-directories of a city holding the two acquisitions
    pub date_dirs: [String; 2],
    /// Sorted band index whose size all bands are resampled to
    pub template_band: usize,
    /// Band indices used for RGB previews
    pub rgb_bands: [usize; 3],
    /// Format of raw mask arrays written next to the PNG
    pub array_format: String,
    /// Log file, or None for console logging only
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for KitConfig {
    fn default() -> Self {
        KitConfig {
            patch_size: DEFAULT_PATCH_SIZE,
            date_dirs: DEFAULT_DATE_DIRS.map(String::from),
            template_band: DEFAULT_TEMPLATE_BAND,
            rgb_bands: DEFAULT_RGB_BANDS,
            array_format: DEFAULT_ARRAY_FORMAT.to_string(),
            log_file: None,
            log_level: LevelFilter::Info,
        }
    }
}

fn config_error(key: &str, expected: &str) -> KitError {
    KitError::Config(format!("{} must be {}", key, expected))
}

fn read_usize(value: &toml::Value, key: &str) -> KitResult<usize> {
    value.as_integer()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| config_error(key, "a non-negative integer"))
}

fn read_str<'a>(value: &'a toml::Value, key: &str) -> KitResult<&'a str> {
    value.as_str().ok_or_else(|| config_error(key, "a string"))
}

fn read_array<'a>(value: &'a toml::Value, key: &str, len: usize) -> KitResult<&'a Vec<toml::Value>> {
    value.as_array()
        .filter(|items| items.len() == len)
        .ok_or_else(|| config_error(key, &format!("an array of {} values", len)))
}

/// Parses a log level name such as `info` or `debug`
pub fn parse_level(name: &str) -> KitResult<LevelFilter> {
    name.parse::<LevelFilter>()
        .map_err(|_| KitError::Config(format!("Unknown log level: {}", name)))
}

impl KitConfig {
    /// Parses a configuration from TOML text
    ///
    /// # Arguments
    /// * `content` - TOML document
    ///
    /// # Returns
    /// The validated configuration, with defaults for missing keys
    pub fn from_str(content: &str) -> KitResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| KitError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut config = KitConfig::default();

        if let Some(patch) = toml_value.get("patch") {
            if let Some(size) = patch.get("size") {
                config.patch_size = read_usize(size, "patch.size")?;
            }
        }

        if let Some(scene) = toml_value.get("scene") {
            if let Some(dirs) = scene.get("date_dirs") {
                let dirs = read_array(dirs, "scene.date_dirs", 2)?;
                config.date_dirs = [
                    read_str(&dirs[0], "scene.date_dirs")?.to_string(),
                    read_str(&dirs[1], "scene.date_dirs")?.to_string(),
                ];
            }
            if let Some(template) = scene.get("template_band") {
                config.template_band = read_usize(template, "scene.template_band")?;
            }
            if let Some(bands) = scene.get("rgb_bands") {
                let bands = read_array(bands, "scene.rgb_bands", 3)?;
                for (slot, value) in config.rgb_bands.iter_mut().zip(bands) {
                    *slot = read_usize(value, "scene.rgb_bands")?;
                }
            }
        }

        if let Some(output) = toml_value.get("output") {
            if let Some(format) = output.get("array_format") {
                config.array_format = read_str(format, "output.array_format")?.to_lowercase();
            }
        }

        if let Some(logging) = toml_value.get("logging") {
            if let Some(file) = logging.get("file") {
                config.log_file = Some(PathBuf::from(read_str(file, "logging.file")?));
            }
            if let Some(level) = logging.get("level") {
                config.log_level = parse_level(read_str(level, "logging.level")?)?;
            }
        }

        config.validate()?;
        debug!("Parsed configuration: {:?}", config);
        Ok(config)
    }

    /// Loads a configuration file
    pub fn from_file(path: &Path) -> KitResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Checks value ranges that TOML types alone cannot express
    pub fn validate(&self) -> KitResult<()> {
        if self.patch_size == 0 {
            return Err(config_error("patch.size", "at least 1"));
        }
        if self.date_dirs[0].is_empty() || self.date_dirs[0] == self.date_dirs[1] {
            return Err(config_error("scene.date_dirs", "two distinct directory names"));
        }
        if !ARRAY_FORMATS.contains(&self.array_format.as_str()) {
            return Err(config_error("output.array_format", &format!("one of {}", ARRAY_FORMATS.join(", "))));
        }
        Ok(())
    }

    /// The date directories as borrowed names
    pub fn date_dirs(&self) -> [&str; 2] {
        [self.date_dirs[0].as_str(), self.date_dirs[1].as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(KitConfig::from_str("").unwrap(), KitConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = KitConfig::from_str(r#"
            [patch]
            size = 32

            [scene]
            date_dirs = ["before", "after"]
            template_band = 1
            rgb_bands = [2, 1, 0]

            [output]
            array_format = "CSV"

            [logging]
            file = "run.log"
            level = "debug"
        "#).unwrap();

        assert_eq!(config.patch_size, 32);
        assert_eq!(config.date_dirs(), ["before", "after"]);
        assert_eq!(config.template_band, 1);
        assert_eq!(config.rgb_bands, [2, 1, 0]);
        assert_eq!(config.array_format, "csv");
        assert_eq!(config.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_values() {
        for bad in [
            "[patch]\nsize = 0",
            "[patch]\nsize = -4",
            "[patch]\nsize = \"big\"",
            "[scene]\ndate_dirs = [\"a\", \"a\"]",
            "[scene]\ndate_dirs = [\"a\"]",
            "[scene]\nrgb_bands = [1, 2]",
            "[output]\narray_format = \"tiff\"",
            "[logging]\nlevel = \"loud\"",
            "not toml at all [",
        ] {
            assert!(matches!(KitConfig::from_str(bad), Err(KitError::Config(_))), "{}", bad);
        }
    }
}
