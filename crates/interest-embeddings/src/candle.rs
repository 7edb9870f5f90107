//! Candle-based sentence embedder.
//!
//! Loads a BERT-family sentence-transformers checkpoint and mean-pools the
//! last hidden state into one unit vector per text.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Upper bound on tokens fed to the encoder per text
pub const MAX_SEQ_LENGTH: usize = 256;

/// Shape fields read from config.json alongside the BERT config
#[derive(Debug, Deserialize)]
struct ModelShape {
    hidden_size: usize,
    max_position_embeddings: usize,
}

/// Sentence embedder over a BERT-family checkpoint.
///
/// Texts longer than the sequence limit are truncated by the tokenizer;
/// a batch is padded to its longest member.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the model files from the cache, downloading them first if needed.
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        Self::load_from_paths(&cache.repo_id, &paths.config, &paths.tokenizer, &paths.weights)
    }

    pub fn load_from_paths(
        name: &str,
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        info!(model = name, "Loading embedding model...");

        let raw_config = std::fs::read_to_string(config_path)?;
        let invalid = |e: serde_json::Error| {
            EmbeddingError::ModelNotFound(format!("invalid config {}: {}", config_path.display(), e))
        };
        let bert_config: BertConfig = serde_json::from_str(&raw_config).map_err(invalid)?;
        let shape: ModelShape = serde_json::from_str(&raw_config).map_err(invalid)?;
        let max_sequence_length = shape.max_position_embeddings.min(MAX_SEQ_LENGTH);

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..PaddingParams::default()
        }));

        let device = Device::Cpu;
        // SAFETY: the weights file belongs to the model cache and is not
        // rewritten while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = BertModel::load(vb, &bert_config)?;

        let info = ModelInfo {
            name: name.to_string(),
            dimension: shape.hidden_size,
            max_sequence_length,
        };
        info!(
            model = name,
            dim = info.dimension,
            max_seq = info.max_sequence_length,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info,
        })
    }

    /// Stack one field of every encoding into a `(batch, seq)` tensor.
    fn stack_field(
        &self,
        encodings: &[Encoding],
        field: fn(&Encoding) -> &[u32],
    ) -> Result<Tensor, EmbeddingError> {
        let rows = encodings
            .iter()
            .map(|encoding| Tensor::new(field(encoding), &self.device))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tensor::stack(&rows, 0)?)
    }
}

/// Average token vectors per text, ignoring padding.
///
/// `hidden` is `(batch, seq, dim)`, `mask` is `(batch, seq)`.
fn mean_pool(hidden: &Tensor, mask: &Tensor) -> Result<Tensor, EmbeddingError> {
    let weights = mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&weights)?.sum(1)?;
    let token_counts = weights.sum(1)?.clamp(1e-9, f64::MAX)?;
    Ok(summed.broadcast_div(&token_counts)?)
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidInput("model returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let input_ids = self.stack_field(&encodings, Encoding::get_ids)?;
        let attention_mask = self.stack_field(&encodings, Encoding::get_attention_mask)?;
        let token_type_ids = input_ids.zeros_like()?;
        debug!(count = texts.len(), shape = ?input_ids.dims(), "Embedding batch");

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled: Vec<Vec<f32>> = mean_pool(&hidden, &attention_mask)?.to_vec2()?;

        Ok(pooled.into_iter().map(Embedding::new).collect())
    }
}
