//! Patch grid layout
//!
//! A scene of `H x W` pixels is covered by four groups of `p x p` patches:
//! the aligned grid, a strip of tiles hugging the right edge, a strip
//! hugging the bottom edge, and a single bottom-right corner tile. The
//! edge strips overlap the grid whenever `H` or `W` is not a multiple of
//! `p`; those overlaps are resolved by write order during reconstruction.
//!
//! `PatchLayout` is the complete description of that tiling. Both the
//! extractor and the reconstructor walk `PatchLayout::origins`, so the
//! order in which patches leave a scene is by construction the order in
//! which they are written back.

use std::fmt;

use super::errors::{PatchError, PatchResult};

/// Which of the four tiling groups a patch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    /// Aligned tile inside the top-left `hs*p x ws*p` region
    Grid,
    /// Tile from the rightmost `p`-wide strip, ordered top to bottom
    LastColumn,
    /// Tile from the bottommost `p`-tall strip, ordered left to right
    LastRow,
    /// The bottom-right `p x p` tile
    Corner,
}

impl PatchKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatchKind::Grid => "grid",
            PatchKind::LastColumn => "last-column",
            PatchKind::LastRow => "last-row",
            PatchKind::Corner => "corner",
        }
    }
}

/// Top-left pixel of one patch, tagged with its position in the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOrigin {
    /// Position in the emitted patch sequence
    pub index: usize,
    /// Tiling group of the patch
    pub kind: PatchKind,
    /// First scene row covered by the patch
    pub row: usize,
    /// First scene column covered by the patch
    pub col: usize,
}

/// The metadata tuple `(hs, ws, lc, lr, H, W)` plus the patch size it describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchLayout {
    /// Edge length of every patch
    pub patch_size: usize,
    /// Grid rows (`H div p`)
    pub hs: usize,
    /// Grid columns (`W div p`)
    pub ws: usize,
    /// Tiles in the right-edge strip
    pub lc: usize,
    /// Tiles in the bottom-edge strip
    pub lr: usize,
    /// Scene height in pixels
    pub height: usize,
    /// Scene width in pixels
    pub width: usize,
}

impl PatchLayout {
    /// Compute the tiling of an `height x width` scene
    ///
    /// # Arguments
    /// * `height` - Scene rows
    /// * `width` - Scene columns
    /// * `patch_size` - Patch edge length
    ///
    /// # Returns
    /// The layout, or `InvalidPatchSize` / `Dimension` if the scene cannot
    /// hold a single patch
    pub fn compute(height: usize, width: usize, patch_size: usize) -> PatchResult<Self> {
        if patch_size == 0 {
            return Err(PatchError::InvalidPatchSize(patch_size));
        }
        if height < patch_size || width < patch_size {
            return Err(PatchError::Dimension { height, width, patch_size });
        }

        let hs = height / patch_size;
        let ws = width / patch_size;

        // The right strip spans the full height and the bottom strip the full
        // width, each tiled with stride p and any short remainder dropped.
        let lc = strip_tile_count(height, patch_size);
        let lr = strip_tile_count(width, patch_size);

        Ok(PatchLayout { patch_size, hs, ws, lc, lr, height, width })
    }

    /// Rebuild a layout from an explicit metadata tuple
    ///
    /// The tuple must be exactly what `compute` produces for `(height, width,
    /// patch_size)`; anything else is rejected rather than repaired.
    pub fn from_parts(
        hs: usize,
        ws: usize,
        lc: usize,
        lr: usize,
        height: usize,
        width: usize,
        patch_size: usize,
    ) -> PatchResult<Self> {
        let expected = Self::compute(height, width, patch_size).map_err(|e| {
            PatchError::InconsistentLayout(format!("tuple does not describe a scene: {}", e))
        })?;

        let given = PatchLayout { patch_size, hs, ws, lc, lr, height, width };
        if given != expected {
            return Err(PatchError::InconsistentLayout(format!(
                "got {}, but a {}x{} scene with patch size {} tiles as {}",
                given, height, width, patch_size, expected
            )));
        }

        Ok(given)
    }

    /// Number of aligned grid patches
    pub fn grid_count(&self) -> usize {
        self.hs * self.ws
    }

    /// Total patch count, `hs*ws + lc + lr + 1`
    pub fn total(&self) -> usize {
        self.grid_count() + self.lc + self.lr + 1
    }

    /// The metadata tuple in its canonical order
    pub fn as_tuple(&self) -> (usize, usize, usize, usize, usize, usize) {
        (self.hs, self.ws, self.lc, self.lr, self.height, self.width)
    }

    /// Every patch origin in emission order
    ///
    /// Grid patches row-major, then the right strip top to bottom, then the
    /// bottom strip left to right, then the corner.
    pub fn origins(&self) -> impl Iterator<Item = PatchOrigin> + '_ {
        let p = self.patch_size;
        let right = self.width - p;
        let bottom = self.height - p;

        let grid = (0..self.hs).flat_map(move |i| {
            (0..self.ws).map(move |j| (PatchKind::Grid, i * p, j * p))
        });
        let last_column = (0..self.lc).map(move |i| (PatchKind::LastColumn, i * p, right));
        let last_row = (0..self.lr).map(move |j| (PatchKind::LastRow, bottom, j * p));
        let corner = std::iter::once((PatchKind::Corner, bottom, right));

        grid.chain(last_column)
            .chain(last_row)
            .chain(corner)
            .enumerate()
            .map(|(index, (kind, row, col))| PatchOrigin { index, kind, row, col })
    }
}

impl fmt::Display for PatchLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(hs={}, ws={}, lc={}, lr={}, h={}, w={}; p={})",
            self.hs, self.ws, self.lc, self.lr, self.height, self.width, self.patch_size
        )
    }
}

/// Full tiles obtained by striding a strip of `length` pixels with step `p`
fn strip_tile_count(length: usize, patch_size: usize) -> usize {
    (length - patch_size) / patch_size + 1
}
