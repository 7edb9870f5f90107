//! Embedding error types.

use thiserror::Error;

/// Failures while resolving, loading or running an embedding model.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Identifier does not resolve, or a model file is missing or unreadable
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Hub download failed
    #[error("Failed to download model: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend produced something unusable for the given text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two vectors that must share a dimension do not
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
