//! Error types for the linter module

use std::path::PathBuf;
use thiserror::Error;

use tfcheck_core::ParseError;

/// Errors that abort a lint run
#[derive(Debug, Error)]
pub enum LinterError {
    /// The configuration directory could not be listed
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source, variable or configuration file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or variable file has a syntax error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid configuration provided
    #[error("Invalid configuration in {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// Failed to write the report
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
