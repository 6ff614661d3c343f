//! Error types for patch tiling and mask reconstruction

use std::fmt;

/// Faults raised by the patch extractor and mask reconstructor
///
/// Every variant is fatal: tiling never clamps counts or crops a scene
/// to make malformed input fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Scene is smaller than one patch along height or width
    Dimension {
        height: usize,
        width: usize,
        patch_size: usize,
    },
    /// Prediction sequence length differs from `hs*ws + lc + lr + 1`
    PatchCountMismatch { expected: usize, actual: usize },
    /// Patches (or scenes) disagree on band depth
    BandCountMismatch { expected: usize, actual: usize },
    /// Patch size of zero
    InvalidPatchSize(usize),
    /// A predicted patch is not `patch_size x patch_size`
    PatchShapeMismatch {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A metadata tuple that does not describe a tiling of its own scene
    InconsistentLayout(String),
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchError::Dimension { height, width, patch_size } => write!(
                f,
                "Scene of {}x{} is smaller than one {}x{} patch",
                height, width, patch_size, patch_size
            ),
            PatchError::PatchCountMismatch { expected, actual } => write!(
                f,
                "Patch count mismatch: layout expects {} patches, got {}",
                expected, actual
            ),
            PatchError::BandCountMismatch { expected, actual } => write!(
                f,
                "Band count mismatch: expected {} bands, got {}",
                expected, actual
            ),
            PatchError::InvalidPatchSize(size) => write!(f, "Invalid patch size: {}", size),
            PatchError::PatchShapeMismatch { index, expected, actual } => write!(
                f,
                "Patch #{} has shape {}x{}, expected {}x{}",
                index, actual.0, actual.1, expected.0, expected.1
            ),
            PatchError::InconsistentLayout(msg) => write!(f, "Inconsistent patch layout: {}", msg),
        }
    }
}

impl std::error::Error for PatchError {}

/// Result type for patch operations
pub type PatchResult<T> = Result<T, PatchError>;
