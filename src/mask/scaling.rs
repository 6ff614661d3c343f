//! 8-bit rendering of masks and bands

use image::{ImageBuffer, Rgb, RgbImage};
use log::debug;
use ndarray::{Array2, ArrayView2, Axis};

use crate::errors::KitResult;
use crate::patch::PatchError;
use crate::raster::Scene;

/// Min-max scales a mask to `0..=255`
///
/// A constant mask has no range to stretch and becomes all zeros.
pub fn scale_to_u8(mask: ArrayView2<'_, u8>) -> Array2<u8> {
    let min = mask.iter().copied().min().unwrap_or(0);
    let max = mask.iter().copied().max().unwrap_or(0);

    if max == min {
        return Array2::zeros(mask.raw_dim());
    }

    let range = f32::from(max - min);
    mask.mapv(|v| (f32::from(v - min) / range * 255.0) as u8)
}

/// Percentile of already sorted values, interpolating linearly between ranks
fn percentile(sorted: &[f32], pct: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f32)
}

/// Contrast-stretches a band between two percentiles
///
/// # Arguments
/// * `band` - Band values
/// * `lower_pct` - Percentile mapped to 0 (2 for previews)
/// * `upper_pct` - Percentile mapped to 255 (98 for previews)
///
/// # Returns
/// The stretched band, clipped to `0..=255`
pub fn stretch_8bit(band: ArrayView2<'_, f32>, lower_pct: f32, upper_pct: f32) -> Array2<u8> {
    let mut sorted: Vec<f32> = band.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let lower = percentile(&sorted, lower_pct);
    let upper = percentile(&sorted, upper_pct);
    debug!("Stretching {:?} band between {} and {}", band.dim(), lower, upper);

    if upper <= lower {
        return Array2::zeros(band.raw_dim());
    }

    band.mapv(|v| (((v - lower) / (upper - lower)).clamp(0.0, 1.0) * 255.0) as u8)
}

/// Builds a stretched RGB preview from three bands of a scene
///
/// # Arguments
/// * `scene` - Stacked scene
/// * `bands` - Band indices for red, green and blue
pub fn rgb_preview(scene: &Scene, bands: [usize; 3]) -> KitResult<RgbImage> {
    if let Some(&missing) = bands.iter().find(|&&b| b >= scene.depth()) {
        return Err(PatchError::BandCountMismatch {
            expected: missing + 1,
            actual: scene.depth(),
        }.into());
    }

    let channels: Vec<Array2<u8>> = bands.iter()
        .map(|&b| stretch_8bit(scene.data.index_axis(Axis(2), b), 2.0, 98.0))
        .collect();

    let preview = ImageBuffer::from_fn(scene.width() as u32, scene.height() as u32, |x, y| {
        let (r, c) = (y as usize, x as usize);
        Rgb([channels[0][[r, c]], channels[1][[r, c]], channels[2][[r, c]]])
    });

    Ok(preview)
}
