use std::io;
use std::path::PathBuf;

use endpoint_config::ResolutionError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the pbx-confgen CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or parsing configuration.
    ///
    /// This error is returned when there are issues with the configuration file,
    /// such as invalid values or file access problems.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The input dump could not be read from the filesystem.
    #[error("Failed to read input file {path:?}: {source}")]
    ReadInput { path: PathBuf, source: io::Error },

    /// The resolved output could not be serialized or written.
    #[error("Failed to write output: {0}")]
    Output(String),

    /// Template resolution rejected the input.
    ///
    /// The whole export is abandoned; no partial output is written.
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// The requested user has no function key templates in the dump.
    #[error("User {0} has no function key templates")]
    UnknownUser(u64),
}
