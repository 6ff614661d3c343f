//! Mask reconstruction command

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::api::ChangeKit;
use crate::commands::command_traits::Command;
use crate::commands::{input_path, required_path};
use crate::config::KitConfig;
use crate::errors::KitResult;

/// Command for turning per-patch predictions into a scene mask
pub struct ReconstructCommand {
    /// `.npy` predictions
    predictions: PathBuf,
    /// Layout sidecar written during export
    layout: PathBuf,
    /// Scaled PNG mask
    output: PathBuf,
    /// Raw class array, written only when an array format was asked for
    array_output: Option<PathBuf>,
    kit: ChangeKit,
}

impl ReconstructCommand {
    /// Create a new reconstruct command
    ///
    /// The mask defaults to `<predictions>.png`. Passing `--array-format`
    /// also writes the raw classes to `<output>_classes.<format>`.
    pub fn new(args: &ArgMatches, config: KitConfig) -> KitResult<Self> {
        let predictions = input_path(args)?;
        let layout = required_path(args, "layout")?;

        let output = args.get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| predictions.with_extension("png"));

        let array_output = args.get_one::<String>("array-format").map(|_| {
            let stem = output.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "mask".to_string());
            output.with_file_name(format!("{}_classes.{}", stem, config.array_format))
        });

        Ok(ReconstructCommand {
            predictions,
            layout,
            output,
            array_output,
            kit: ChangeKit::new(config)?,
        })
    }
}

impl Command for ReconstructCommand {
    fn execute(&self) -> KitResult<()> {
        info!("Reconstructing {} with layout {}", self.predictions.display(), self.layout.display());

        let mask = self.kit.reconstruct(
            &self.predictions,
            &self.layout,
            &self.output,
            self.array_output.as_deref(),
        )?;

        let changed = mask.iter().filter(|&&v| v != 0).count();
        println!("Mask: {}x{} ({} non-zero pixels)", mask.nrows(), mask.ncols(), changed);
        println!("Output: {}", self.output.display());
        if let Some(path) = &self.array_output {
            println!("Classes: {}", path.display());
        }
        Ok(())
    }
}
