//! Mask reconstruction
//!
//! Reassembles a full `(H, W)` mask from per-patch predictions. Patches are
//! written in the extraction order, so the edge strips overwrite the grid
//! and the corner overwrites everything beneath it. Every pixel ends up with
//! exactly one final value.

use log::{debug, info};
use ndarray::{s, Array2};

use super::errors::{PatchError, PatchResult};
use super::layout::PatchLayout;

/// Write predictions back into a zero-filled scene-sized mask
///
/// # Arguments
/// * `predicted` - One `p x p` prediction per patch, in extraction order
/// * `layout` - Layout produced when the scene was tiled
///
/// # Returns
/// The `(H, W)` mask, or `PatchCountMismatch` / `PatchShapeMismatch` if the
/// predictions do not fit the layout
pub fn reconstruct_mask<T: Clone + Default>(predicted: &[Array2<T>], layout: &PatchLayout) -> PatchResult<Array2<T>> {
    let expected = layout.total();
    if predicted.len() != expected {
        return Err(PatchError::PatchCountMismatch { expected, actual: predicted.len() });
    }

    let p = layout.patch_size;
    for (index, patch) in predicted.iter().enumerate() {
        if patch.dim() != (p, p) {
            return Err(PatchError::PatchShapeMismatch {
                index,
                expected: (p, p),
                actual: patch.dim(),
            });
        }
    }

    info!("Reconstructing {}x{} mask from {} patches", layout.height, layout.width, expected);

    let mut img = Array2::from_elem((layout.height, layout.width), T::default());
    for origin in layout.origins() {
        debug!("Writing {} patch #{} at ({}, {})",
               origin.kind.name(), origin.index, origin.row, origin.col);
        img.slice_mut(s![origin.row..origin.row + p, origin.col..origin.col + p])
            .assign(&predicted[origin.index]);
    }

    Ok(img)
}

/// Reconstruct from the bare metadata tuple
///
/// The tuple is validated with `PatchLayout::from_parts` before any
/// prediction is placed.
pub fn reconstruct<T: Clone + Default>(
    predicted: &[Array2<T>],
    hs: usize,
    ws: usize,
    lc: usize,
    lr: usize,
    height: usize,
    width: usize,
    patch_size: usize,
) -> PatchResult<Array2<T>> {
    let layout = PatchLayout::from_parts(hs, ws, lc, lr, height, width, patch_size)?;
    reconstruct_mask(predicted, &layout)
}
