//! Logging and progress reporting shared by the binary and the API

pub mod logger;
pub mod progress;
