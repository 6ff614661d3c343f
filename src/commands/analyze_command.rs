//! Scene pair analysis command
//!
//! Prints the bands of both dates, the stacked scene shape and the patch
//! layout the configured patch size produces.

use clap::ArgMatches;
use log::{debug, info};
use std::path::PathBuf;

use crate::api::ChangeKit;
use crate::commands::command_traits::Command;
use crate::commands::input_path;
use crate::config::KitConfig;
use crate::errors::KitResult;
use crate::raster::discover_band_files;

/// Command for analysing a city directory
pub struct AnalyzeCommand {
    /// City directory holding the two date directories
    city_dir: PathBuf,
    /// Also dump the TIFF structure of every band file
    verbose: bool,
    kit: ChangeKit,
}

impl AnalyzeCommand {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `config` - Run configuration
    ///
    /// # Returns
    /// A new AnalyzeCommand instance or an error
    pub fn new(args: &ArgMatches, config: KitConfig) -> KitResult<Self> {
        Ok(AnalyzeCommand {
            city_dir: input_path(args)?,
            verbose: args.get_flag("verbose"),
            kit: ChangeKit::new(config)?,
        })
    }

    /// Dump the TIFF structure of each band file of both dates
    fn display_band_files(&self) -> KitResult<()> {
        for date_dir in self.kit.config().date_dirs() {
            for path in discover_band_files(&self.city_dir.join(date_dir))? {
                info!("{}", self.kit.describe_band(&path)?);
            }
        }
        Ok(())
    }
}

impl Command for AnalyzeCommand {
    fn execute(&self) -> KitResult<()> {
        info!("Analyzing city: {}", self.city_dir.display());

        let summary = self.kit.analyze(&self.city_dir)?;
        println!("{}", summary);

        if self.verbose {
            self.display_band_files()?;
        }

        debug!("Analysis completed successfully");
        Ok(())
    }
}
