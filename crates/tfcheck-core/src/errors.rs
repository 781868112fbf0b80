//! Error taxonomy
//!
//! Only [`ParseError`] aborts a run. [`UnresolvableReference`] is contained to
//! the single value being evaluated and [`ExternalStateError`] to the single
//! detector whose pre-processing failed.

use std::path::PathBuf;

/// A source file could not be turned into a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(file: impl Into<String>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { file: file.into(), line, column, message: message.into() }
    }

    pub(crate) fn from_hcl(file: &str, error: &hcl_edit::parser::Error) -> Self {
        let location = error.location();
        Self::new(file, location.line(), location.column(), error.message())
    }
}

/// An interpolation expression could not be statically resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvableReference {
    #[error("variable '{0}' is not declared")]
    UndeclaredVariable(String),

    #[error("variable '{0}' has no default and no assigned value")]
    NoValue(String),

    #[error("cannot statically evaluate '{expr}': {reason}")]
    Unsupported { expr: String, reason: &'static str },

    #[error("'{expr}' evaluates to a {found}, expected a string")]
    NotAString { expr: String, found: &'static str },

    #[error("'{expr}' evaluates to a {found}, expected a list")]
    NotAList { expr: String, found: &'static str },

    #[error("circular variable reference: {}", cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },

    #[error("index {index} is out of range for '{expr}' ({len} elements)")]
    IndexOutOfRange { expr: String, index: u64, len: usize },

    #[error("key '{key}' does not exist in '{expr}'")]
    MissingKey { expr: String, key: String },

    #[error("invalid expression '{text}': {message}")]
    Syntax { text: String, message: String },
}

/// Querying live cloud-provider state failed.
#[derive(Debug, thiserror::Error)]
pub enum ExternalStateError {
    #[error("no cloud state client is configured")]
    Unavailable,

    #[error("unable to read cloud state from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode cloud state from {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} query failed: {message}")]
    Query { service: &'static str, message: String },
}
