//! Prediction post-processing and mask output
//!
//! Class scores are reduced to labels, reconstructed masks are scaled for
//! viewing, and masks are written as images or raw arrays.

mod array;
mod predictions;
mod scaling;

pub use array::{MaskArray, ARRAY_FORMATS};
pub use predictions::{argmax_channels, predictions_from_array};
pub(crate) use predictions::to_label;
pub use scaling::{rgb_preview, scale_to_u8, stretch_8bit};
