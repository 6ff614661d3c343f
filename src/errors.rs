//! Crate-wide error type
//!
//! Wraps the TIFF and patch error domains together with the faults raised
//! by scene loading, mask output, scoring and the command layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::patch::PatchError;
use crate::tiff::errors::TiffError;

/// Errors raised outside the TIFF container and patch core
#[derive(Debug)]
pub enum KitError {
    /// I/O error
    Io(io::Error),
    /// TIFF container or decoding error
    Tiff(TiffError),
    /// Patch tiling or reconstruction error
    Patch(PatchError),
    /// Image encoding/decoding error
    Image(image::ImageError),
    /// Malformed or unsupported NPY file
    Npy(String),
    /// Invalid configuration value
    Config(String),
    /// Masks that cannot be scored against each other
    Metrics(String),
    /// Directory holds no band files
    NoBandFiles(PathBuf),
    /// Two acquisitions of a scene pair differ in size
    SceneShapeMismatch {
        first: (usize, usize),
        second: (usize, usize),
    },
    /// Generic error with message
    Generic(String),
}

impl fmt::Display for KitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KitError::Io(e) => write!(f, "I/O error: {}", e),
            KitError::Tiff(e) => write!(f, "{}", e),
            KitError::Patch(e) => write!(f, "Patch error: {}", e),
            KitError::Image(e) => write!(f, "Image error: {}", e),
            KitError::Npy(msg) => write!(f, "NPY error: {}", msg),
            KitError::Config(msg) => write!(f, "Configuration error: {}", msg),
            KitError::Metrics(msg) => write!(f, "Metrics error: {}", msg),
            KitError::NoBandFiles(dir) => write!(f, "No .tif/.tiff band files in {}", dir.display()),
            KitError::SceneShapeMismatch { first, second } => write!(
                f,
                "Scene shape mismatch: first date is {}x{}, second date is {}x{}",
                first.0, first.1, second.0, second.1
            ),
            KitError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for KitError {}

impl From<io::Error> for KitError {
    fn from(error: io::Error) -> Self {
        KitError::Io(error)
    }
}

impl From<TiffError> for KitError {
    fn from(error: TiffError) -> Self {
        KitError::Tiff(error)
    }
}

impl From<PatchError> for KitError {
    fn from(error: PatchError) -> Self {
        KitError::Patch(error)
    }
}

impl From<image::ImageError> for KitError {
    fn from(error: image::ImageError) -> Self {
        KitError::Image(error)
    }
}

impl From<String> for KitError {
    fn from(msg: String) -> Self {
        KitError::Generic(msg)
    }
}

/// Result type for crate-level operations
pub type KitResult<T> = Result<T, KitError>;
