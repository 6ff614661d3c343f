//! Patch export command

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::api::{default_export_dir, ChangeKit};
use crate::commands::command_traits::Command;
use crate::commands::input_path;
use crate::config::KitConfig;
use crate::errors::KitResult;

/// Command for cutting a scene pair into patch batches
pub struct PatchCommand {
    city_dir: PathBuf,
    /// Directory receiving the batches and layout sidecar
    out_dir: PathBuf,
    preview: bool,
    kit: ChangeKit,
}

impl PatchCommand {
    /// Create a new patch export command
    ///
    /// The output directory defaults to `<city>_patches`.
    pub fn new(args: &ArgMatches, config: KitConfig) -> KitResult<Self> {
        let city_dir = input_path(args)?;
        let out_dir = args.get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_export_dir(&city_dir));

        Ok(PatchCommand {
            city_dir,
            out_dir,
            preview: args.get_flag("preview"),
            kit: ChangeKit::new(config)?,
        })
    }
}

impl Command for PatchCommand {
    fn execute(&self) -> KitResult<()> {
        info!("Exporting patches of {} to {}", self.city_dir.display(), self.out_dir.display());

        let layout = self.kit.export_patches(&self.city_dir, &self.out_dir, self.preview)?;

        println!("Patch layout: {}", layout);
        println!("Patches per date: {}", layout.total());
        println!("Output: {}", self.out_dir.display());
        Ok(())
    }
}
