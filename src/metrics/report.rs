//! Scoring reports for change maps and land-cover masks

use log::info;
use ndarray::{Array2, ArrayView2};
use std::fmt;

use crate::errors::KitResult;

use super::confusion::{ClassScores, ConfusionMatrix};

/// Maps every non-zero pixel to 1
///
/// Reference change maps store change as 255 and saved masks may be
/// scaled, so any non-zero value counts as change.
pub fn binarise(mask: ArrayView2<'_, u8>) -> Array2<u8> {
    mask.mapv(|v| u8::from(v != 0))
}

/// Accuracy plus precision, recall and F1 of a scored mask
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    /// Number of scored pixels
    pub pixels: u64,
    /// Number of classes the masks were scored over
    pub num_classes: usize,
    /// Percentage of matching pixels
    pub accuracy: f64,
    /// Scores of the change class (label 1)
    pub change: ClassScores,
    /// Support-weighted average over all classes
    pub weighted: ClassScores,
}

impl MetricsReport {
    fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        MetricsReport {
            pixels: matrix.total(),
            num_classes: matrix.num_classes(),
            accuracy: matrix.accuracy(),
            change: matrix.binary_report(1),
            weighted: matrix.weighted_report(),
        }
    }
}

/// Scores a predicted change map against a reference change map
///
/// Both maps are binarised first.
pub fn score_change_map(truth: ArrayView2<'_, u8>, predicted: ArrayView2<'_, u8>) -> KitResult<MetricsReport> {
    let matrix = ConfusionMatrix::from_masks(binarise(truth).view(), binarise(predicted).view(), 2)?;
    let report = MetricsReport::from_matrix(&matrix);
    info!("Change map: accuracy {:.2}%, F1 {:.4}", report.accuracy, report.change.f1);
    Ok(report)
}

/// Scores a multi-class mask against reference labels
///
/// The number of classes is one more than the largest label of either mask.
pub fn score_classes(truth: ArrayView2<'_, u8>, predicted: ArrayView2<'_, u8>) -> KitResult<MetricsReport> {
    let max_label = truth.iter().chain(predicted.iter()).copied().max().unwrap_or(0);
    let matrix = ConfusionMatrix::from_masks(truth, predicted, max_label as usize + 1)?;
    let report = MetricsReport::from_matrix(&matrix);
    info!("Land cover: accuracy {:.2}%, weighted F1 {:.4}", report.accuracy, report.weighted.f1);
    Ok(report)
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pixels: {}", self.pixels)?;
        writeln!(f, "Classes: {}", self.num_classes)?;
        writeln!(f, "Accuracy: {:.2}%", self.accuracy)?;
        writeln!(f, "Change precision: {:.4}", self.change.precision)?;
        writeln!(f, "Change recall: {:.4}", self.change.recall)?;
        writeln!(f, "Change F1: {:.4} (support {})", self.change.f1, self.change.support)?;
        writeln!(f, "Weighted precision: {:.4}", self.weighted.precision)?;
        writeln!(f, "Weighted recall: {:.4}", self.weighted.recall)?;
        write!(f, "Weighted F1: {:.4}", self.weighted.f1)
    }
}
