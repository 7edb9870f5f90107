//! Configuration loading for bio-interest.
//!
//! Layered config: defaults -> config file -> CLI config file -> env vars.
//! CLI flags are applied by the caller on top of the loaded value.
//!
//! Settings are an explicit value: load once, validate, then pass the
//! relevant section into the extractor and aggregator constructors.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Taxonomy used when no categories are configured.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "blockchain",
    "cryptocurrency",
    "decentralized finance",
    "defi",
    "nft",
    "smart contracts",
    "ethereum",
    "bitcoin",
    "web3",
    "zero knowledge",
    "privacy",
    "machine learning",
    "deep learning",
    "artificial intelligence",
    "distributed systems",
    "filecoin",
    "ipfs",
    "peer-to-peer",
    "data analytics",
    "python",
    "rust",
    "go",
    "javascript",
    "solidity",
    "cryptography",
];

/// Default sentence-embedding model identifier
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Interest extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Embedding model identifier (bare name or Hub repo id)
    #[serde(default = "default_model")]
    pub model: String,

    /// Ordered taxonomy of candidate categories
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Minimum cosine similarity for a category to be kept.
    /// Range: open interval (0.0, 1.0).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Size of the ranked window scanned per bio
    #[serde(default = "default_extractor_top_n")]
    pub top_n: usize,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_similarity_threshold() -> f32 {
    0.4
}

fn default_extractor_top_n() -> usize {
    3
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            categories: default_categories(),
            similarity_threshold: default_similarity_threshold(),
            top_n: default_extractor_top_n(),
        }
    }
}

impl ExtractorConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "categories must contain at least one label".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(self.categories.len());
        for category in &self.categories {
            if category.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "categories must not contain blank labels".to_string(),
                ));
            }
            if !seen.insert(category.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate category: {}",
                    category
                )));
            }
        }
        validate_threshold(self.similarity_threshold)?;
        validate_top_n(self.top_n)
    }
}

/// Check that a similarity threshold lies strictly inside (0, 1).
pub fn validate_threshold(threshold: f32) -> Result<(), ConfigError> {
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(ConfigError::Invalid(format!(
            "similarity_threshold must be in (0.0, 1.0), got {}",
            threshold
        )));
    }
    Ok(())
}

/// Check that a ranking window is non-empty.
pub fn validate_top_n(top_n: usize) -> Result<(), ConfigError> {
    if top_n == 0 {
        return Err(ConfigError::Invalid("top_n must be > 0".to_string()));
    }
    Ok(())
}

/// Self vs. network aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Relative weight of the user's own interests
    #[serde(default = "default_self_weight")]
    pub self_weight: f64,

    /// Relative weight of the followed accounts' interests
    #[serde(default = "default_followings_weight")]
    pub followings_weight: f64,

    /// Number of ranked interests returned
    #[serde(default = "default_aggregator_top_n")]
    pub top_n: usize,

    /// Whether callers forwarding configuration want scores attached
    #[serde(default)]
    pub return_scores: bool,
}

fn default_self_weight() -> f64 {
    0.2
}

fn default_followings_weight() -> f64 {
    0.8
}

fn default_aggregator_top_n() -> usize {
    5
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            self_weight: default_self_weight(),
            followings_weight: default_followings_weight(),
            top_n: default_aggregator_top_n(),
            return_scores: false,
        }
    }
}

impl AggregatorConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("self_weight", self.self_weight),
            ("followings_weight", self.followings_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a finite value >= 0.0, got {}",
                    name, weight
                )));
            }
        }
        if self.self_weight + self.followings_weight <= 0.0 {
            return Err(ConfigError::Invalid(
                "self_weight and followings_weight must not both be zero".to_string(),
            ));
        }
        validate_top_n(self.top_n)
    }
}

/// Follow-graph sync service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Trigger a sync before looking up bios
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the sync service
    #[serde(default = "default_sync_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_sync_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token (loaded from env var, not written back out)
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_sync_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_sync_timeout_secs() -> u64 {
    300
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_sync_base_url(),
            timeout_secs: default_sync_timeout_secs(),
            api_token: None,
        }
    }
}

impl SyncConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sync.base_url must not be empty when sync is enabled".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Matcher configuration
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Aggregator configuration
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Sync service configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Follow-graph snapshot file used as the bio source
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Override for the model download cache directory
    #[serde(default)]
    pub model_cache_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            aggregator: AggregatorConfig::default(),
            sync: SyncConfig::default(),
            snapshot_path: None,
            model_cache_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/bio-interest/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (INTEREST_*, `__` between sections)
    ///
    /// The result is not validated; call [`Settings::validate`] after
    /// applying CLI overrides.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "bio-interest")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self::load_layers(&config_dir, cli_config_path, None)
    }

    /// Layered load from an explicit config directory.
    ///
    /// `env` replaces the process environment when given.
    fn load_layers(
        config_dir: &Path,
        cli_config_path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("extractor.model", default_model())
            .map_err(load_error)?
            .set_default("extractor.categories", default_categories())
            .map_err(load_error)?
            .set_default(
                "extractor.similarity_threshold",
                f64::from(default_similarity_threshold()),
            )
            .map_err(load_error)?
            .set_default("extractor.top_n", default_extractor_top_n() as i64)
            .map_err(load_error)?
            .set_default("aggregator.self_weight", default_self_weight())
            .map_err(load_error)?
            .set_default("aggregator.followings_weight", default_followings_weight())
            .map_err(load_error)?
            .set_default("aggregator.top_n", default_aggregator_top_n() as i64)
            .map_err(load_error)?
            .set_default("aggregator.return_scores", false)
            .map_err(load_error)?
            .set_default("sync.enabled", default_true())
            .map_err(load_error)?
            .set_default("sync.base_url", default_sync_base_url())
            .map_err(load_error)?
            .set_default("sync.timeout_secs", default_sync_timeout_secs() as i64)
            .map_err(load_error)?
            .set_default("log_level", default_log_level())
            .map_err(load_error)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // INTEREST_EXTRACTOR__MODEL, INTEREST_AGGREGATOR__SELF_WEIGHT, ...
        builder = builder.add_source(
            Environment::with_prefix("INTEREST")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("extractor.categories")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().map_err(load_error)?;

        config.try_deserialize().map_err(load_error)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extractor.validate()?;
        self.aggregator.validate()?;
        self.sync.validate()
    }

    /// Directory used for downloaded model files, if overridden.
    pub fn model_cache_path(&self) -> Option<PathBuf> {
        self.model_cache_dir.as_ref().map(PathBuf::from)
    }
}

fn load_error(e: config::ConfigError) -> ConfigError {
    ConfigError::Load(e.to_string())
}
