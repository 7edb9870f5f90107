//! End-to-end interest inference for one user.
//!
//! 1. Trigger a follow-graph sync
//! 2. Look up the user's bio and their followings' bios
//! 3. Extract categories from every bio (blocking worker)
//! 4. Aggregate self and network categories into one ranking

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use interest_core::{InterestAggregator, InterestExtractor};
use interest_sources::{
    BioSource, HttpSyncClient, HttpSyncConfig, NoopSync, SyncTrigger, UserBios,
};
use interest_types::{RankedInterests, Settings, SyncConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::PipelineError;

/// Wall-clock time spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub sync: Duration,
    pub fetch: Duration,
    pub extract: Duration,
    pub aggregate: Duration,
    pub total: Duration,
}

/// Result of one inference run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestReport {
    /// Lowercased username the run was made for
    pub username: String,
    /// Embedding model identifier used for extraction
    pub model: String,
    /// Number of followed accounts considered
    pub followings_count: usize,
    pub interests: RankedInterests,
    pub timings: StageTimings,
}

/// Per-call overrides for [`InterestPipeline::infer_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferOptions {
    /// Aggregation window; configured value when `None`
    pub top_n: Option<usize>,
    /// Attach scores; configured `return_scores` when `None`
    pub return_scores: Option<bool>,
}

/// Build the sync trigger described by the configuration.
pub fn sync_trigger_from_config(
    config: &SyncConfig,
) -> Result<Arc<dyn SyncTrigger>, PipelineError> {
    if !config.enabled {
        warn!("Follow-graph sync disabled; bios may be stale");
        return Ok(Arc::new(NoopSync));
    }
    let client = HttpSyncClient::new(HttpSyncConfig::from(config)).map_err(PipelineError::Sync)?;
    Ok(Arc::new(client))
}

/// Composes sync, bio lookup, extraction and aggregation.
///
/// Cheap to clone; every component is shared behind an `Arc`.
#[derive(Clone)]
pub struct InterestPipeline {
    extractor: Arc<InterestExtractor>,
    aggregator: Arc<InterestAggregator>,
    bios: Arc<dyn BioSource>,
    sync: Arc<dyn SyncTrigger>,
}

impl InterestPipeline {
    pub fn new(
        extractor: Arc<InterestExtractor>,
        aggregator: Arc<InterestAggregator>,
        bios: Arc<dyn BioSource>,
        sync: Arc<dyn SyncTrigger>,
    ) -> Self {
        Self {
            extractor,
            aggregator,
            bios,
            sync,
        }
    }

    /// Load the configured model and wire up the collaborators.
    ///
    /// Model loading runs on a blocking worker.
    pub async fn from_settings(
        settings: &Settings,
        bios: Arc<dyn BioSource>,
    ) -> Result<Self, PipelineError> {
        settings
            .validate()
            .map_err(|e| PipelineError::Interest(e.into()))?;

        let aggregator = InterestAggregator::new(&settings.aggregator)?;
        let sync = sync_trigger_from_config(&settings.sync)?;

        let extractor_config = settings.extractor.clone();
        let cache_dir: Option<PathBuf> = settings.model_cache_path();
        let extractor = tokio::task::spawn_blocking(move || {
            InterestExtractor::load(&extractor_config, cache_dir.as_deref())
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;

        Ok(Self::new(
            Arc::new(extractor),
            Arc::new(aggregator),
            bios,
            sync,
        ))
    }

    /// Infer interests using configured defaults.
    pub async fn infer(&self, username: &str) -> Result<InterestReport, PipelineError> {
        self.infer_with(username, InferOptions::default()).await
    }

    /// Infer interests for a user.
    ///
    /// Fails with [`PipelineError::UserNotFound`] when the bio source has
    /// no such user; a user following nobody is ranked on their own bio.
    pub async fn infer_with(
        &self,
        username: &str,
        options: InferOptions,
    ) -> Result<InterestReport, PipelineError> {
        let user = username.to_lowercase();
        info!(user = %user, "Starting interest analysis");
        let start_total = Instant::now();

        let sync_start = Instant::now();
        self.sync
            .sync_followings(&user)
            .await
            .map_err(PipelineError::Sync)?;
        let sync = sync_start.elapsed();
        info!(user = %user, elapsed_ms = sync.as_millis() as u64, "Sync completed");

        let fetch_start = Instant::now();
        let bios = self
            .bios
            .lookup(&user)
            .await
            .map_err(PipelineError::Source)?
            .ok_or_else(|| PipelineError::UserNotFound(user.clone()))?;
        let fetch = fetch_start.elapsed();
        let followings_count = bios.followings.len();
        info!(
            user = %user,
            followings = followings_count,
            elapsed_ms = fetch.as_millis() as u64,
            "Fetched bios"
        );

        let extract_start = Instant::now();
        let (user_interests, followings_interests) = self.extract_all(bios).await?;
        let extract = extract_start.elapsed();
        debug!(
            user = %user,
            interests = ?user_interests,
            elapsed_ms = extract.as_millis() as u64,
            "Extracted interests for user and followings"
        );

        let aggregate_start = Instant::now();
        let return_scores = options
            .return_scores
            .unwrap_or_else(|| self.aggregator.returns_scores());
        let interests = if return_scores {
            RankedInterests::Scored(self.aggregator.aggregate_scored(
                &user_interests,
                &followings_interests,
                options.top_n,
            )?)
        } else {
            RankedInterests::Labels(self.aggregator.aggregate(
                &user_interests,
                &followings_interests,
                options.top_n,
            )?)
        };
        let aggregate = aggregate_start.elapsed();

        let total = start_total.elapsed();
        info!(
            user = %user,
            top = ?interests.categories(),
            elapsed_ms = total.as_millis() as u64,
            "Analysis completed"
        );

        Ok(InterestReport {
            username: user,
            model: self.extractor.model_info().name.clone(),
            followings_count,
            interests,
            timings: StageTimings {
                sync,
                fetch,
                extract,
                aggregate,
                total,
            },
        })
    }

    async fn extract_all(
        &self,
        bios: UserBios,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), PipelineError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || -> Result<_, PipelineError> {
            let user_interests = extractor.extract(&bios.bio)?;
            let followings_interests = bios
                .followings
                .iter()
                .map(|following| extractor.extract(&following.bio))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((user_interests, followings_interests))
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
    }
}
