//! Bio to category matching.
//!
//! Category labels are embedded once when the extractor is built. Each
//! bio is embedded per call, compared against every category, and the
//! best-ranked categories above the similarity threshold are returned.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use interest_embeddings::{
    CandleEmbedder, Embedding, EmbeddingError, EmbeddingModel, ModelCache, ModelInfo,
};
use interest_types::{validate_threshold, validate_top_n, ExtractorConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::InterestError;

/// Characters of bio text included in log lines
const LOG_PREVIEW_CHARS: usize = 100;

/// A category matched against a bio, with its cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub category: String,
    pub similarity: f32,
}

/// Maps free-text bios onto the configured taxonomy.
///
/// Holds the taxonomy embeddings for its whole lifetime and never mutates
/// them, so one extractor can be shared across threads behind an `Arc`.
pub struct InterestExtractor {
    model: Arc<dyn EmbeddingModel>,
    categories: Vec<String>,
    category_embeddings: Vec<Embedding>,
    top_n: usize,
    similarity_threshold: f32,
}

impl std::fmt::Debug for InterestExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterestExtractor")
            .field("model", self.model.info())
            .field("categories", &self.categories)
            .field("top_n", &self.top_n)
            .field("similarity_threshold", &self.similarity_threshold)
            .finish()
    }
}

impl InterestExtractor {
    /// Resolve the configured model, load it with Candle and embed the
    /// taxonomy.
    ///
    /// Any failure to resolve, download or load the model is reported as
    /// [`InterestError::ModelLoad`].
    pub fn load(config: &ExtractorConfig, cache_dir: Option<&Path>) -> Result<Self, InterestError> {
        config.validate()?;

        let cache =
            ModelCache::for_model(&config.model, cache_dir).map_err(InterestError::ModelLoad)?;
        let embedder = CandleEmbedder::load(&cache).map_err(InterestError::ModelLoad)?;

        Self::with_model(config, Arc::new(embedder))
    }

    /// Build an extractor around an already loaded model.
    pub fn with_model(
        config: &ExtractorConfig,
        model: Arc<dyn EmbeddingModel>,
    ) -> Result<Self, InterestError> {
        config.validate()?;

        let category_embeddings = model.embed_texts(&config.categories)?;
        if category_embeddings.len() != config.categories.len() {
            return Err(InterestError::Embedding(EmbeddingError::InvalidInput(
                format!(
                    "model returned {} embeddings for {} categories",
                    category_embeddings.len(),
                    config.categories.len()
                ),
            )));
        }
        let dimension = category_embeddings[0].dimension();
        if let Some(bad) = category_embeddings
            .iter()
            .find(|e| e.dimension() != dimension)
        {
            return Err(InterestError::Embedding(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: bad.dimension(),
            }));
        }

        info!(
            model = %model.info().name,
            categories = config.categories.len(),
            dim = dimension,
            "Category embeddings ready"
        );

        Ok(Self {
            model,
            categories: config.categories.clone(),
            category_embeddings,
            top_n: config.top_n,
            similarity_threshold: config.similarity_threshold,
        })
    }

    /// The taxonomy, in configured order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn model_info(&self) -> &ModelInfo {
        self.model.info()
    }

    /// Extract interests using the configured window and threshold.
    pub fn extract(&self, bio: &str) -> Result<Vec<String>, InterestError> {
        self.extract_with(bio, None, None)
    }

    /// Extract interests with optional per-call overrides.
    pub fn extract_with(
        &self,
        bio: &str,
        top_n: Option<usize>,
        similarity_threshold: Option<f32>,
    ) -> Result<Vec<String>, InterestError> {
        Ok(self
            .extract_scored_with(bio, top_n, similarity_threshold)?
            .into_iter()
            .map(|m| m.category)
            .collect())
    }

    /// Extract interests with their similarities, using configured defaults.
    pub fn extract_scored(&self, bio: &str) -> Result<Vec<CategoryMatch>, InterestError> {
        self.extract_scored_with(bio, None, None)
    }

    /// Rank categories for a bio.
    ///
    /// Only the `top_n` most similar categories are considered; of those,
    /// the ones at or above the threshold are returned in descending
    /// similarity order. Categories past the window are never returned,
    /// even if they clear the threshold.
    ///
    /// Blank bios return an empty list without touching the model.
    pub fn extract_scored_with(
        &self,
        bio: &str,
        top_n: Option<usize>,
        similarity_threshold: Option<f32>,
    ) -> Result<Vec<CategoryMatch>, InterestError> {
        let top_n = top_n.unwrap_or(self.top_n);
        let threshold = similarity_threshold.unwrap_or(self.similarity_threshold);
        validate_top_n(top_n).map_err(|e| InterestError::InvalidInput(e.to_string()))?;
        validate_threshold(threshold).map_err(|e| InterestError::InvalidInput(e.to_string()))?;

        if bio.trim().is_empty() {
            return Ok(Vec::new());
        }

        let bio_embedding = self.model.embed(bio)?;

        let mut ranked: Vec<(usize, f32)> = self
            .category_embeddings
            .iter()
            .enumerate()
            .map(|(idx, category)| Ok((idx, category.cosine_similarity(&bio_embedding)?)))
            .collect::<Result<_, EmbeddingError>>()?;

        // Stable: equal similarities keep taxonomy order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let matches: Vec<CategoryMatch> = ranked
            .into_iter()
            .take(top_n)
            .filter(|(_, similarity)| *similarity >= threshold)
            .map(|(idx, similarity)| CategoryMatch {
                category: self.categories[idx].clone(),
                similarity,
            })
            .collect();

        debug!(
            bio = %preview(bio),
            top_n,
            threshold,
            matched = matches.len(),
            "Extracted interests"
        );

        Ok(matches)
    }

    /// Extract interests for many bios, in order. Stops at the first error.
    pub fn extract_batch(&self, bios: &[String]) -> Result<Vec<Vec<String>>, InterestError> {
        bios.iter().map(|bio| self.extract(bio)).collect()
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
