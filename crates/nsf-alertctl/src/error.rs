//! CLI error types.

use nsf_alerts::AlertError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The alerting configuration could not be loaded or used.
    #[error("configuration error: {0}")]
    Config(#[source] AlertError),

    /// The alert could not be dispatched or delivered.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AlertError> for CliError {
    fn from(err: AlertError) -> Self {
        if err.is_fatal() {
            Self::Config(err)
        } else {
            Self::Dispatch(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(format!("JSON serialization failed: {err}"))
    }
}
