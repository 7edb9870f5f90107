//! # interest-types
//!
//! Shared types for the bio-interest workspace.
//!
//! - Settings: layered configuration for the extractor, aggregator and sync
//! - Ranked results: label-only or scored interest lists
//!
//! ## Usage
//!
//! ```rust
//! use interest_types::Settings;
//!
//! let settings = Settings::default();
//! assert!(settings.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod interest;

pub use config::{
    validate_threshold, validate_top_n, AggregatorConfig, ExtractorConfig, Settings, SyncConfig,
    DEFAULT_CATEGORIES, DEFAULT_MODEL,
};
pub use error::ConfigError;
pub use interest::{RankedInterests, ScoredInterest};
