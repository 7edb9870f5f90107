//! Interest pipeline error types.

use interest_embeddings::EmbeddingError;
use interest_types::ConfigError;
use thiserror::Error;

/// Errors raised by the extractor and aggregator.
#[derive(Debug, Error)]
pub enum InterestError {
    /// The configured embedding model could not be resolved or loaded
    #[error("Failed to load embedding model: {0}")]
    ModelLoad(#[source] EmbeddingError),

    /// Embedding a text failed at call time
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Constructor received invalid configuration
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Call-time argument out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
