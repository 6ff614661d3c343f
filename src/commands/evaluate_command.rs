//! Mask scoring command

use clap::ArgMatches;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::api::ChangeKit;
use crate::commands::command_traits::Command;
use crate::commands::{input_path, required_path};
use crate::config::KitConfig;
use crate::errors::KitResult;

/// Command for scoring a mask against ground truth
pub struct EvaluateCommand {
    mask: PathBuf,
    truth: PathBuf,
    /// Score as multi-class land cover instead of binary change
    classes: bool,
    kit: ChangeKit,
}

impl EvaluateCommand {
    pub fn new(args: &ArgMatches, config: KitConfig) -> KitResult<Self> {
        Ok(EvaluateCommand {
            mask: input_path(args)?,
            truth: required_path(args, "truth")?,
            classes: args.get_flag("classes"),
            kit: ChangeKit::new(config)?,
        })
    }
}

/// Whether a mask file is likely the min-max scaled PNG from reconstruction
///
/// Raw class arrays are `.npy` files or carry the `_classes` stem suffix.
fn looks_scaled(path: &Path) -> bool {
    let is_png = path.extension().map_or(false, |e| e.eq_ignore_ascii_case("png"));
    let is_classes = path.file_stem()
        .map_or(false, |s| s.to_string_lossy().ends_with("_classes"));
    is_png && !is_classes
}

impl Command for EvaluateCommand {
    fn execute(&self) -> KitResult<()> {
        info!("Scoring {} against {}", self.mask.display(), self.truth.display());

        let report = if self.classes {
            if looks_scaled(&self.mask) {
                warn!(
                    "{} looks like a scaled preview mask; land-cover scores need the raw classes written with --array-format",
                    self.mask.display()
                );
            }
            self.kit.evaluate_classes(&self.mask, &self.truth)?
        } else {
            self.kit.evaluate(&self.mask, &self.truth)?
        };

        println!("{}", report);
        Ok(())
    }
}
