//! Pipeline error types.

use interest_core::InterestError;
use interest_sources::SourceError;
use thiserror::Error;

/// Errors surfaced by [`crate::InterestPipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The bio source has no record of this user
    #[error("User {0} not found")]
    UserNotFound(String),

    /// The follow-graph sync failed before lookup
    #[error("Failed to sync user followings: {0}")]
    Sync(#[source] SourceError),

    /// The bio source failed
    #[error("Bio lookup failed: {0}")]
    Source(#[source] SourceError),

    /// Extraction or aggregation failed
    #[error(transparent)]
    Interest(#[from] InterestError),

    /// The blocking extraction worker did not complete
    #[error("Task error: {0}")]
    Task(String),
}
