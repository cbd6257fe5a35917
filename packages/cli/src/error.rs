//! Error types for the command-line front end.

use thiserror::Error;
use usv_connectors::{ConnectorError, SubmissionError};

/// Main error type for the `usv` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Connector tables or datasets could not be loaded.
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// A submission was rejected.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input or output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid environment configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid command-line argument.
    #[error("{0}")]
    Usage(String),

    /// The checked bundle file has errors.
    #[error("Bundle has {errors} error(s)")]
    InvalidBundle { errors: usize },
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
