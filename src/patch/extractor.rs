//! Patch extraction
//!
//! Splits a band-stacked `(H, W, D)` scene into the deterministic patch
//! sequence described by `PatchLayout`.

use log::{debug, info};
use ndarray::{s, stack, Array2, Array3, Array4, ArrayView3, Axis};

use super::errors::{PatchError, PatchResult};
use super::layout::PatchLayout;

/// Ordered patches cut from one scene, with the layout needed to invert the cut
#[derive(Debug, Clone)]
pub struct PatchSet<T> {
    /// Patches of shape `(p, p, D)` in emission order
    pub patches: Vec<Array3<T>>,
    /// Tiling metadata
    pub layout: PatchLayout,
}

impl<T: Clone> PatchSet<T> {
    /// Number of patches
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Band depth shared by every patch
    ///
    /// # Returns
    /// The depth, or `BandCountMismatch` if two patches disagree
    pub fn depth(&self) -> PatchResult<usize> {
        let expected = self.patches.first().map(|p| p.dim().2).unwrap_or(0);
        for patch in &self.patches {
            let actual = patch.dim().2;
            if actual != expected {
                return Err(PatchError::BandCountMismatch { expected, actual });
            }
        }
        Ok(expected)
    }

    /// Stack the patches into a channels-first `(N, D, p, p)` batch
    ///
    /// This is the layout an inference collaborator consumes.
    pub fn to_batch(&self) -> PatchResult<Array4<T>> {
        let depth = self.depth()?;
        let p = self.layout.patch_size;

        if self.patches.is_empty() {
            return Array4::from_shape_vec((0, depth, p, p), Vec::new())
                .map_err(|e| PatchError::InconsistentLayout(e.to_string()));
        }

        let views: Vec<_> = self.patches.iter()
            .map(|patch| patch.view().permuted_axes([2, 0, 1]))
            .collect();

        stack(Axis(0), &views).map_err(|e| PatchError::InconsistentLayout(e.to_string()))
    }
}

/// Cut a scene into grid, last-column, last-row and corner patches
///
/// # Arguments
/// * `scene` - Band-stacked scene of shape `(H, W, D)`
/// * `patch_size` - Patch edge length
///
/// # Returns
/// The `hs*ws + lc + lr + 1` patches in emission order along with their
/// layout, or `Dimension` if the scene is smaller than one patch
pub fn extract_patches<T: Clone>(scene: ArrayView3<'_, T>, patch_size: usize) -> PatchResult<PatchSet<T>> {
    let (height, width, depth) = scene.dim();
    let layout = PatchLayout::compute(height, width, patch_size)?;

    info!("Extracting {} patches of {}x{}x{} from {}x{} scene",
          layout.total(), patch_size, patch_size, depth, height, width);
    debug!("Patch layout: {}", layout);

    let mut patches = Vec::with_capacity(layout.total());
    for origin in layout.origins() {
        let patch = scene
            .slice(s![origin.row..origin.row + patch_size, origin.col..origin.col + patch_size, ..])
            .to_owned();
        patches.push(patch);
    }

    Ok(PatchSet { patches, layout })
}

/// Take one band plane from every patch
///
/// Useful for feeding input patches straight back into reconstruction.
///
/// # Arguments
/// * `patches` - Patches of shape `(p, p, D)`
/// * `band` - Band index, must be below `D` for every patch
pub fn band_planes<T: Clone>(patches: &[Array3<T>], band: usize) -> PatchResult<Vec<Array2<T>>> {
    patches.iter()
        .map(|patch| {
            let depth = patch.dim().2;
            if band >= depth {
                return Err(PatchError::BandCountMismatch { expected: band + 1, actual: depth });
            }
            Ok(patch.index_axis(Axis(2), band).to_owned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_scene(height: usize, width: usize, depth: usize) -> Array3<u32> {
        Array3::from_shape_fn((height, width, depth), |(r, c, d)| {
            (r * 10_000 + c * 10 + d) as u32
        })
    }

    #[test]
    fn test_example_100x100_with_13_bands() {
        let scene = numbered_scene(100, 100, 13);
        let set = extract_patches(scene.view(), 64).unwrap();

        assert_eq!(set.layout.as_tuple(), (1, 1, 1, 1, 100, 100));
        assert_eq!(set.len(), 4);
        for patch in &set.patches {
            assert_eq!(patch.dim(), (64, 64, 13));
        }

        // grid, right strip, bottom strip, corner
        assert_eq!(set.patches[0][[0, 0, 0]], scene[[0, 0, 0]]);
        assert_eq!(set.patches[1][[0, 0, 0]], scene[[0, 36, 0]]);
        assert_eq!(set.patches[2][[0, 0, 0]], scene[[36, 0, 0]]);
        assert_eq!(set.patches[3][[0, 0, 0]], scene[[36, 36, 0]]);
        assert_eq!(set.patches[3][[63, 63, 12]], scene[[99, 99, 12]]);
    }

    #[test]
    fn test_count_formula_holds() {
        for &(h, w, p) in &[(64, 64, 64), (65, 64, 64), (200, 130, 32), (97, 301, 16), (7, 5, 1)] {
            let set = extract_patches(numbered_scene(h, w, 2).view(), p).unwrap();
            let expected = (h / p) * (w / p) + set.layout.lc + set.layout.lr + 1;
            assert_eq!(set.len(), expected, "scene {}x{} p={}", h, w, p);
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let scene = numbered_scene(150, 90, 3);
        let a = extract_patches(scene.view(), 32).unwrap();
        let b = extract_patches(scene.view(), 32).unwrap();

        assert_eq!(a.layout, b.layout);
        assert_eq!(a.patches, b.patches);
    }

    #[test]
    fn test_small_scene_is_rejected() {
        let scene = numbered_scene(40, 100, 1);
        let err = extract_patches(scene.view(), 64).unwrap_err();
        assert_eq!(err, PatchError::Dimension { height: 40, width: 100, patch_size: 64 });
    }

    #[test]
    fn test_batch_is_channels_first() {
        let scene = numbered_scene(100, 100, 3);
        let set = extract_patches(scene.view(), 64).unwrap();
        let batch = set.to_batch().unwrap();

        assert_eq!(batch.dim(), (4, 3, 64, 64));
        assert_eq!(batch[[1, 2, 5, 7]], set.patches[1][[5, 7, 2]]);
    }

    #[test]
    fn test_mixed_depths_are_rejected() {
        let scene = numbered_scene(64, 64, 3);
        let mut set = extract_patches(scene.view(), 64).unwrap();
        set.patches[2] = Array3::zeros((64, 64, 2));

        assert_eq!(set.depth(), Err(PatchError::BandCountMismatch { expected: 3, actual: 2 }));
        assert!(set.to_batch().is_err());
    }

    #[test]
    fn test_band_planes_checks_band_index() {
        let scene = numbered_scene(64, 64, 2);
        let set = extract_patches(scene.view(), 64).unwrap();

        let planes = band_planes(&set.patches, 1).unwrap();
        assert_eq!(planes[0][[3, 4]], scene[[3, 4, 1]]);
        assert!(matches!(band_planes(&set.patches, 2), Err(PatchError::BandCountMismatch { .. })));
    }
}
