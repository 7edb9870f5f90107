//! Model file caching.
//!
//! Resolves a model identifier to a HuggingFace Hub repository, then
//! downloads and caches its files locally.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Hub organisation used for bare model names
pub const DEFAULT_MODEL_ORG: &str = "sentence-transformers";

/// Required model files
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Map a model identifier to a Hub repository id.
///
/// `all-MiniLM-L6-v2` becomes `sentence-transformers/all-MiniLM-L6-v2`;
/// identifiers that already name an organisation are kept.
pub fn resolve_repo_id(model: &str) -> Result<String, EmbeddingError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(EmbeddingError::ModelNotFound(
            "empty model identifier".to_string(),
        ));
    }
    if model.contains('/') {
        let valid = model.split('/').count() == 2 && model.split('/').all(|p| !p.is_empty());
        if !valid {
            return Err(EmbeddingError::ModelNotFound(format!(
                "malformed model identifier: {}",
                model
            )));
        }
        Ok(model.to_string())
    } else {
        Ok(format!("{}/{}", DEFAULT_MODEL_ORG, model))
    }
}

/// Model cache configuration
#[derive(Debug, Clone)]
pub struct ModelCache {
    /// Cache directory path
    pub cache_dir: PathBuf,
    /// Model repository ID
    pub repo_id: String,
}

/// Default cache directory (~/.cache/bio-interest/models)
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("bio-interest")
        .join("models")
}

impl ModelCache {
    /// Create a new model cache with custom settings
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Cache for a configured model identifier.
    ///
    /// Uses the default cache directory unless `cache_dir` is given.
    pub fn for_model(model: &str, cache_dir: Option<&Path>) -> Result<Self, EmbeddingError> {
        let repo_id = resolve_repo_id(model)?;
        let cache_dir = cache_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(default_cache_dir);
        Ok(Self::new(cache_dir, repo_id))
    }

    /// Get the model directory path
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Whether every model file is already on disk
    pub fn is_cached(&self) -> bool {
        MODEL_FILES.iter().all(|f| self.file_path(f).exists())
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }
}

/// Local paths of a cached model's files
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        }
    }
}

/// Make sure every model file is present locally, fetching missing ones
/// from the Hub.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    let model_dir = cache.model_dir();
    let missing: Vec<&str> = MODEL_FILES
        .iter()
        .copied()
        .filter(|file| !model_dir.join(file).exists())
        .collect();

    if missing.is_empty() {
        debug!(path = ?model_dir, "Using cached model");
    } else {
        info!(repo = %cache.repo_id, files = ?missing, "Downloading model files...");
        fetch_files(cache, &missing)?;
    }

    Ok(ModelPaths::in_dir(&model_dir))
}

fn fetch_files(cache: &ModelCache, files: &[&str]) -> Result<(), EmbeddingError> {
    let api = hf_hub::api::sync::Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());
    std::fs::create_dir_all(cache.model_dir())?;

    for &file in files {
        let fetched = repo.get(file).map_err(|e| {
            EmbeddingError::Download(format!("{} from {}: {}", file, cache.repo_id, e))
        })?;
        let dest = cache.file_path(file);
        std::fs::copy(&fetched, &dest)?;
        debug!(file, dest = ?dest, "Cached model file");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_bare_name() {
        assert_eq!(
            resolve_repo_id("all-MiniLM-L6-v2").unwrap(),
            "sentence-transformers/all-MiniLM-L6-v2"
        );
    }

    #[test]
    fn test_resolve_full_repo_id() {
        assert_eq!(
            resolve_repo_id("BAAI/bge-small-en-v1.5").unwrap(),
            "BAAI/bge-small-en-v1.5"
        );
    }

    #[test]
    fn test_resolve_rejects_malformed() {
        assert!(resolve_repo_id("").is_err());
        assert!(resolve_repo_id("   ").is_err());
        assert!(resolve_repo_id("a/b/c").is_err());
        assert!(resolve_repo_id("/model").is_err());
    }

    #[test]
    fn test_for_model_uses_given_dir() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::for_model("paraphrase-mpnet-base-v2", Some(temp.path())).unwrap();
        assert_eq!(cache.cache_dir, temp.path());
        assert_eq!(
            cache.model_dir(),
            temp.path()
                .join("sentence-transformers_paraphrase-mpnet-base-v2")
        );
    }

    #[test]
    fn test_default_dir_is_namespaced() {
        let cache = ModelCache::for_model("all-MiniLM-L6-v2", None).unwrap();
        assert!(cache.cache_dir.to_string_lossy().contains("bio-interest"));
    }

    #[test]
    fn test_is_cached_requires_every_file() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::new(temp.path(), "test/model");
        assert!(!cache.is_cached());

        std::fs::create_dir_all(cache.model_dir()).unwrap();
        std::fs::write(cache.file_path("config.json"), "{}").unwrap();
        std::fs::write(cache.file_path("tokenizer.json"), "{}").unwrap();
        assert!(!cache.is_cached());

        std::fs::write(cache.file_path("model.safetensors"), "").unwrap();
        assert!(cache.is_cached());
    }
}
