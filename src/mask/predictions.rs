//! Turning model output into per-patch class maps

use log::{debug, info};
use ndarray::{Array2, ArrayD, ArrayView4, Axis, Ix3, Ix4};

use crate::errors::{KitError, KitResult};

/// Reduces `(N, C, p, p)` scores to one class map per patch
///
/// Ties go to the lowest channel index. NaN scores never win.
pub fn argmax_channels(scores: ArrayView4<'_, f32>) -> Vec<Array2<u8>> {
    let (count, channels, rows, cols) = scores.dim();
    debug!("Argmax over {} channels for {} patches", channels, count);

    scores.outer_iter()
        .map(|patch| {
            Array2::from_shape_fn((rows, cols), |(r, c)| {
                let mut best = 0usize;
                let mut best_score = f32::NEG_INFINITY;
                for ch in 0..channels {
                    let score = patch[[ch, r, c]];
                    if score > best_score {
                        best = ch;
                        best_score = score;
                    }
                }
                best as u8
            })
        })
        .collect()
}

/// Converts a class value read back from disk into a label
pub(crate) fn to_label(value: f32) -> KitResult<u8> {
    if !value.is_finite() || value < 0.0 || value > 255.0 || value.fract() != 0.0 {
        return Err(KitError::Npy(format!("{} is not a class label in 0..=255", value)));
    }
    Ok(value as u8)
}

/// Interprets a predictions array as per-patch class maps
///
/// # Arguments
/// * `predictions` - `(N, p, p)` class indices or `(N, C, p, p)` scores
///
/// # Returns
/// One `(p, p)` map per patch
pub fn predictions_from_array(predictions: ArrayD<f32>) -> KitResult<Vec<Array2<u8>>> {
    match predictions.ndim() {
        3 => {
            let labels = predictions.into_dimensionality::<Ix3>()
                .map_err(|e| KitError::Npy(e.to_string()))?;
            info!("Predictions are class maps {:?}", labels.dim());

            labels.axis_iter(Axis(0))
                .map(|plane| {
                    let values = plane.iter()
                        .map(|&v| to_label(v))
                        .collect::<KitResult<Vec<u8>>>()?;
                    Array2::from_shape_vec(plane.raw_dim(), values)
                        .map_err(|e| KitError::Npy(e.to_string()))
                })
                .collect()
        }
        4 => {
            let scores = predictions.into_dimensionality::<Ix4>()
                .map_err(|e| KitError::Npy(e.to_string()))?;
            let channels = scores.dim().1;
            if channels == 0 || channels > 256 {
                return Err(KitError::Npy(format!("Cannot take argmax over {} channels", channels)));
            }
            info!("Predictions are class scores {:?}, taking argmax", scores.dim());
            Ok(argmax_channels(scores.view()))
        }
        rank => Err(KitError::Npy(format!(
            "Predictions must be (N, p, p) or (N, C, p, p), got rank {}", rank
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array4, IxDyn};

    #[test]
    fn test_argmax_prefers_first_maximum() {
        let mut scores = Array4::<f32>::zeros((2, 3, 2, 2));
        scores[[0, 1, 0, 0]] = 0.9;
        scores[[0, 2, 0, 1]] = 0.4;
        scores[[0, 0, 0, 1]] = 0.4;
        scores[[1, 2, 1, 1]] = 5.0;

        let maps = argmax_channels(scores.view());
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0][[0, 0]], 1);
        assert_eq!(maps[0][[0, 1]], 0);
        assert_eq!(maps[0][[1, 0]], 0);
        assert_eq!(maps[1][[1, 1]], 2);
    }

    #[test]
    fn test_class_maps_pass_through() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 2, 2]), vec![0., 1., 1., 0., 2., 2., 0., 0.]).unwrap();
        let maps = predictions_from_array(array).unwrap();
        assert_eq!(maps[0], Array2::from_shape_vec((2, 2), vec![0, 1, 1, 0]).unwrap());
        assert_eq!(maps[1][[0, 1]], 2);
    }

    #[test]
    fn test_bad_predictions_are_rejected() {
        let fractional = ArrayD::from_elem(IxDyn(&[1, 2, 2]), 0.5f32);
        assert!(predictions_from_array(fractional).is_err());

        let flat = ArrayD::from_elem(IxDyn(&[4, 4]), 1.0f32);
        assert!(matches!(predictions_from_array(flat), Err(KitError::Npy(_))));
    }
}
