//! Change-map and land-cover scoring

mod confusion;
mod report;

pub use confusion::{ClassScores, ConfusionMatrix};
pub use report::{binarise, score_change_map, score_classes, MetricsReport};
