//! Error types for configuration handling.

use thiserror::Error;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized
    #[error("Configuration error: {0}")]
    Load(String),

    /// A configuration value is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
