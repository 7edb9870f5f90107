//! Error types for external collaborators.

use thiserror::Error;

/// Errors raised by bio sources and sync triggers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level HTTP failure (connect, timeout, body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed snapshot or response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Client could not be configured
    #[error("Invalid configuration: {0}")]
    Config(String),
}
