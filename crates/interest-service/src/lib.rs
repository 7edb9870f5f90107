//! # interest-service
//!
//! Orchestration of the interest pipeline: sync the follow graph, read
//! bios, extract categories and aggregate them for one user.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use interest_service::InterestPipeline;
//! use interest_sources::InMemoryBioSource;
//! use interest_types::Settings;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(None)?;
//! let bios = Arc::new(InMemoryBioSource::load("graph.json").await?);
//! let pipeline = InterestPipeline::from_settings(&settings, bios).await?;
//! let report = pipeline.infer("alice").await?;
//! println!("{:?}", report.interests.categories());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{
    sync_trigger_from_config, InferOptions, InterestPipeline, InterestReport, StageTimings,
};
