//! Command pattern interfaces
//!
//! Each CLI mode is a `Command`; a `CommandFactory` picks the one the
//! parsed arguments ask for.

use crate::config::KitConfig;
use crate::errors::KitResult;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> KitResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `config` - Configuration with command-line overrides applied
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches, config: KitConfig) -> KitResult<Box<dyn Command>>;
}
