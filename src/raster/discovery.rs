//! Band file discovery
//!
//! The band order of a scene is the lexicographic order of its file names,
//! which for Sentinel-2 tiles is `B01 .. B12` followed by `B8A`.

use glob::{glob_with, MatchOptions, Pattern};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::errors::{KitError, KitResult};

/// Lists the `.tif` / `.tiff` files of `dir` sorted by file name
///
/// # Arguments
/// * `dir` - Directory holding one file per band
///
/// # Returns
/// The sorted paths, or `NoBandFiles` if the directory holds none
pub fn discover_band_files(dir: &Path) -> KitResult<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let base = Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();

    for extension in ["tif", "tiff"] {
        let pattern = format!("{}/*.{}", base, extension);
        let entries = glob_with(&pattern, options)
            .map_err(|e| KitError::Generic(format!("Bad band pattern {}: {}", pattern, e)))?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Bad path from glob: {:?}", e),
            }
        }
    }

    if files.is_empty() {
        return Err(KitError::NoBandFiles(dir.to_path_buf()));
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    info!("Found {} band files in {}", files.len(), dir.display());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("changekit_discovery_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_files_are_sorted_by_name() {
        let dir = scratch_dir("sorted");
        for name in ["T_B08.tif", "T_B01.tif", "T_B8A.TIF", "T_B12.tiff", "notes.txt", "T_B02.tif"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let names: Vec<String> = discover_band_files(&dir).unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["T_B01.tif", "T_B02.tif", "T_B08.tif", "T_B12.tiff", "T_B8A.TIF"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = scratch_dir("empty");
        assert!(matches!(discover_band_files(&dir), Err(KitError::NoBandFiles(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
