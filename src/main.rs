use std::process;
use log::{error, info};

use changekit::commands::{cli, resolve_config, ChangeKitCommandFactory, CommandFactory};
use changekit::config::KitConfig;
use changekit::utils::logger::Logger;

/// Installs the file logger when a log file is configured, `env_logger` otherwise
fn init_logging(config: &KitConfig) {
    match &config.log_file {
        Some(path) => {
            if let Err(e) = Logger::init_global_logger(path, config.log_level) {
                eprintln!("Error setting up logger at {}: {}", path.display(), e);
                process::exit(1);
            }
        }
        None => {
            // RUST_LOG, when set, refines the configured level
            env_logger::Builder::new()
                .filter_level(config.log_level)
                .parse_default_env()
                .format_timestamp_secs()
                .init();
        }
    }
}

fn main() {
    let matches = cli().get_matches();

    let config = match resolve_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    init_logging(&config);
    info!("changekit {} (patch size {})", env!("CARGO_PKG_VERSION"), config.patch_size);

    let factory = ChangeKitCommandFactory::new();

    let command_result = factory.create_command(&matches, config);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
