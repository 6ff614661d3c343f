//! Pixel confusion matrix

use log::debug;
use ndarray::{Array2, ArrayView2, Zip};

use crate::errors::{KitError, KitResult};

/// Precision, recall, F1 and support of one class or an average
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of truth pixels the scores are drawn from
    pub support: u64,
}

/// Zero when the denominator is zero
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Pixel counts indexed by `[truth, predicted]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Array2<u64>,
}

impl ConfusionMatrix {
    /// Counts label pairs of two equally sized masks
    ///
    /// # Arguments
    /// * `truth` - Reference labels
    /// * `predicted` - Predicted labels
    /// * `num_classes` - Labels must lie in `0..num_classes`
    pub fn from_masks(truth: ArrayView2<'_, u8>, predicted: ArrayView2<'_, u8>, num_classes: usize) -> KitResult<Self> {
        if truth.dim() != predicted.dim() {
            return Err(KitError::Metrics(format!(
                "truth is {:?} but prediction is {:?}", truth.dim(), predicted.dim()
            )));
        }

        let mut counts = Array2::<u64>::zeros((num_classes, num_classes));
        let mut out_of_range = None;

        Zip::from(truth).and(predicted).for_each(|&t, &p| {
            let (t, p) = (t as usize, p as usize);
            if t < num_classes && p < num_classes {
                counts[[t, p]] += 1;
            } else if out_of_range.is_none() {
                out_of_range = Some(t.max(p));
            }
        });

        if let Some(label) = out_of_range {
            return Err(KitError::Metrics(format!(
                "label {} is outside 0..{}", label, num_classes
            )));
        }

        debug!("Confusion matrix over {} pixels, {} classes", truth.len(), num_classes);
        Ok(ConfusionMatrix { counts })
    }

    pub fn num_classes(&self) -> usize {
        self.counts.nrows()
    }

    /// Raw counts, rows are truth and columns are predictions
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Percentage of pixels whose prediction equals the truth
    pub fn accuracy(&self) -> f64 {
        let correct: u64 = self.counts.diag().sum();
        100.0 * ratio(correct, self.total())
    }

    /// Scores of a single class against all others
    pub fn class_scores(&self, label: usize) -> ClassScores {
        if label >= self.num_classes() {
            return ClassScores { precision: 0.0, recall: 0.0, f1: 0.0, support: 0 };
        }

        let true_pos = self.counts[[label, label]];
        let predicted: u64 = self.counts.column(label).sum();
        let support: u64 = self.counts.row(label).sum();

        let precision = ratio(true_pos, predicted);
        let recall = ratio(true_pos, support);

        ClassScores {
            precision,
            recall,
            f1: harmonic_mean(precision, recall),
            support,
        }
    }

    /// Scores of the positive class, as for binary change maps
    pub fn binary_report(&self, pos_label: usize) -> ClassScores {
        self.class_scores(pos_label)
    }

    /// Support-weighted mean of the per-class scores
    ///
    /// Classes that appear only in the prediction carry no weight.
    pub fn weighted_report(&self) -> ClassScores {
        let total = self.total();
        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);

        for label in 0..self.num_classes() {
            let scores = self.class_scores(label);
            if scores.support == 0 {
                continue;
            }
            let weight = scores.support as f64;
            precision += scores.precision * weight;
            recall += scores.recall * weight;
            f1 += scores.f1 * weight;
        }

        if total == 0 {
            return ClassScores { precision: 0.0, recall: 0.0, f1: 0.0, support: 0 };
        }

        let total_f = total as f64;
        ClassScores {
            precision: precision / total_f,
            recall: recall / total_f,
            f1: f1 / total_f,
            support: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_binary_scores() {
        // tp=2 fp=1 fn=1 tn=2
        let truth = Array2::from_shape_vec((2, 3), vec![1, 1, 1, 0, 0, 0]).unwrap();
        let pred = Array2::from_shape_vec((2, 3), vec![1, 1, 0, 1, 0, 0]).unwrap();

        let matrix = ConfusionMatrix::from_masks(truth.view(), pred.view(), 2).unwrap();
        assert!(close(matrix.accuracy(), 100.0 * 4.0 / 6.0));

        let change = matrix.binary_report(1);
        assert!(close(change.precision, 2.0 / 3.0));
        assert!(close(change.recall, 2.0 / 3.0));
        assert!(close(change.f1, 2.0 / 3.0));
        assert_eq!(change.support, 3);
    }

    #[test]
    fn test_no_positive_predictions_give_zero() {
        let truth = Array2::from_shape_vec((1, 4), vec![1, 0, 0, 0]).unwrap();
        let pred = Array2::<u8>::zeros((1, 4));

        let change = ConfusionMatrix::from_masks(truth.view(), pred.view(), 2).unwrap().binary_report(1);
        assert_eq!(change.precision, 0.0);
        assert_eq!(change.recall, 0.0);
        assert_eq!(change.f1, 0.0);
    }

    #[test]
    fn test_weighted_average() {
        // class 0: support 2, p=1 r=1; class 1: support 1, p=0.5 r=1; class 2: support 1, p=0 r=0
        let truth = Array2::from_shape_vec((1, 4), vec![0, 0, 1, 2]).unwrap();
        let pred = Array2::from_shape_vec((1, 4), vec![0, 0, 1, 1]).unwrap();

        let weighted = ConfusionMatrix::from_masks(truth.view(), pred.view(), 3).unwrap().weighted_report();
        assert!(close(weighted.precision, (2.0 * 1.0 + 0.5) / 4.0));
        assert!(close(weighted.recall, (2.0 + 1.0) / 4.0));
        assert!(close(weighted.f1, (2.0 + 2.0 / 3.0) / 4.0));
        assert_eq!(weighted.support, 4);
    }

    #[test]
    fn test_rejects_bad_input() {
        let a = Array2::<u8>::zeros((2, 2));
        let b = Array2::<u8>::zeros((2, 3));
        assert!(matches!(ConfusionMatrix::from_masks(a.view(), b.view(), 2), Err(KitError::Metrics(_))));

        let c = Array2::from_elem((2, 2), 5u8);
        assert!(ConfusionMatrix::from_masks(a.view(), c.view(), 2).is_err());
    }
}
