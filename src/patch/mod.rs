//! Patch tiling and mask reconstruction
//!
//! Converts an arbitrarily sized multi-band scene into a fixed grid of
//! square patches for inference, and reassembles per-patch predictions
//! into a full-scene mask.

pub mod errors;
mod layout;
mod extractor;
mod reconstructor;

pub use errors::{PatchError, PatchResult};
pub use layout::{PatchKind, PatchLayout, PatchOrigin};
pub use extractor::{band_planes, extract_patches, PatchSet};
pub use reconstructor::{reconstruct, reconstruct_mask};
