//! CLI command implementations
//!
//! This module contains the command-line surface: the clap definition,
//! the configuration overrides it carries, and one `Command` per mode.

pub mod command_traits;
pub mod analyze_command;
pub mod patch_command;
pub mod reconstruct_command;
pub mod evaluate_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use patch_command::PatchCommand;
pub use reconstruct_command::ReconstructCommand;
pub use evaluate_command::EvaluateCommand;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use crate::config::KitConfig;
use crate::errors::{KitError, KitResult};

/// Command-line definition of the `changekit` binary
pub fn cli() -> ClapCommand {
    ClapCommand::new("changekit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Patch tiling, mask reconstruction and scoring for bi-temporal change detection")
        .arg(
            Arg::new("input")
                .help("City directory, predictions .npy, or mask to score")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("patch")
                .short('p')
                .long("patch")
                .help("Export both dates as patch batches")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["reconstruct", "evaluate"]),
        )
        .arg(
            Arg::new("reconstruct")
                .short('r')
                .long("reconstruct")
                .help("Reconstruct a mask from patch predictions")
                .action(ArgAction::SetTrue)
                .requires("layout")
                .conflicts_with("evaluate"),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .help("Layout sidecar written by --patch")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("evaluate")
                .short('e')
                .long("evaluate")
                .help("Score a mask against ground truth")
                .action(ArgAction::SetTrue)
                .requires("truth"),
        )
        .arg(
            Arg::new("truth")
                .long("truth")
                .help("Ground truth mask")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("classes")
                .long("classes")
                .help("Score as multi-class land cover instead of binary change")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory (--patch) or mask file (--reconstruct)")
                .value_name("PATH")
                .required(false),
        )
        .arg(
            Arg::new("patch-size")
                .long("patch-size")
                .help("Patch edge length in pixels")
                .value_name("PIXELS")
                .value_parser(clap::value_parser!(usize))
                .required(false),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("array-format")
                .long("array-format")
                .help("Also write raw classes as png, csv, json or npy")
                .value_name("FORMAT")
                .required(false),
        )
        .arg(
            Arg::new("preview")
                .long("preview")
                .help("Write RGB previews of both dates")
                .action(ArgAction::SetTrue),
        )
}

/// Loads the configuration file, if any, and applies command-line overrides
pub fn resolve_config(args: &ArgMatches) -> KitResult<KitConfig> {
    let mut config = match args.get_one::<String>("config") {
        Some(path) => KitConfig::from_file(Path::new(path))?,
        None => KitConfig::default(),
    };

    if let Some(&size) = args.get_one::<usize>("patch-size") {
        config.patch_size = size;
    }
    if let Some(format) = args.get_one::<String>("array-format") {
        config.array_format = format.to_lowercase();
    }
    if args.get_flag("verbose") {
        config.log_level = LevelFilter::Debug;
    }

    config.validate()?;
    Ok(config)
}

/// The positional input as a path
pub(crate) fn input_path(args: &ArgMatches) -> KitResult<PathBuf> {
    required_path(args, "input")
}

pub(crate) fn required_path(args: &ArgMatches, name: &str) -> KitResult<PathBuf> {
    args.get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| KitError::Generic(format!("Missing {} argument", name)))
}

/// Factory for creating command instances based on CLI arguments
///
/// `--patch`, `--reconstruct` and `--evaluate` select their modes;
/// anything else analyses the input city.
pub struct ChangeKitCommandFactory;

impl ChangeKitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        ChangeKitCommandFactory
    }
}

impl Default for ChangeKitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for ChangeKitCommandFactory {
    fn create_command(&self, args: &ArgMatches, config: KitConfig) -> KitResult<Box<dyn Command>> {
        if args.get_flag("patch") {
            Ok(Box::new(PatchCommand::new(args, config)?))
        } else if args.get_flag("reconstruct") {
            Ok(Box::new(ReconstructCommand::new(args, config)?))
        } else if args.get_flag("evaluate") {
            Ok(Box::new(EvaluateCommand::new(args, config)?))
        } else {
            Ok(Box::new(AnalyzeCommand::new(args, config)?))
        }
    }
}
