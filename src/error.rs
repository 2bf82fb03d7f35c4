//! Error types for the crate's own plumbing (configuration and logging).
//!
//! Failures of work running against a context are not reported here; they are
//! recorded on the context's error chain (see [`crate::chain`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for SetupError {
    fn from(err: config::ConfigError) -> Self {
        SetupError::Config(err.to_string())
    }
}
