//! # interest-embeddings
//!
//! Local sentence embeddings for bio-interest using Candle.
//!
//! Turns bios and category labels into unit vectors so that semantic
//! closeness is a dot product.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - Any BERT-family sentence-transformers checkpoint on the Hub
//!   (default all-MiniLM-L6-v2, 384 dimensions)
//! - Automatic model file caching
//! - Batch embedding

pub mod cache;
pub mod candle;
pub mod error;
pub mod model;

pub use crate::candle::CandleEmbedder;
pub use cache::{
    default_cache_dir, get_or_download_model, resolve_repo_id, ModelCache, ModelPaths,
    DEFAULT_MODEL_ORG, MODEL_FILES,
};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
