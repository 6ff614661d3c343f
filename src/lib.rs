pub mod errors;
pub mod io;
pub mod tiff;
pub mod compression;
pub mod patch;
pub mod raster;
pub mod mask;
pub mod metrics;
pub mod config;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::ChangeKit;
pub use crate::config::KitConfig;
pub use crate::errors::{KitError, KitResult};

pub use patch::{extract_patches, reconstruct, reconstruct_mask, PatchLayout, PatchSet};
pub use raster::{Scene, SceneLoader, ScenePair};
pub use metrics::MetricsReport;
