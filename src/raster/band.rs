//! Decoded band rasters

use lazy_static::lazy_static;
use log::debug;
use ndarray::Array2;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::errors::KitResult;

use super::band_reader::BandReader;
use super::sample::SampleFormat;

lazy_static! {
    /// Trailing Sentinel-2 style band designator, e.g. `..._B8A.tif`
    static ref BAND_ID: Regex = Regex::new(r"(?i)(?:^|[_\-.])(B(?:8A|\d{1,2}))\.tiff?$").unwrap();
}

/// One spectral band read from disk
#[derive(Debug, Clone)]
pub struct BandRaster {
    /// Source file
    pub path: PathBuf,
    /// Band designator parsed from the file name, or the file stem
    pub band_id: String,
    /// Sample format stored in the file
    pub format: SampleFormat,
    /// Band values widened to `f32`
    pub data: Array2<f32>,
}

impl BandRaster {
    /// Reads and decodes a single-band TIFF
    pub fn open(path: &Path) -> KitResult<Self> {
        let mut reader = BandReader::open(path)?;
        let format = reader.sample_format()?;
        let data = reader.read_band()?;
        let band_id = band_id_from_path(path);

        debug!("Band {} from {}: {:?} {}", band_id, path.display(), data.dim(), format);

        Ok(BandRaster {
            path: path.to_path_buf(),
            band_id,
            format,
            data,
        })
    }

    /// `(height, width)` of the band
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Band designator of a file, upper-cased, falling back to the file stem
pub fn band_id_from_path(path: &Path) -> String {
    let name = path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match BAND_ID.captures(&name) {
        Some(caps) => caps[1].to_uppercase(),
        None => path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(name),
    }
}
