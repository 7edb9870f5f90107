//! Pipeline tests: sync, lookup, extraction and aggregation wired together
//! with deterministic fakes in place of the embedding model and services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use interest_core::{InterestAggregator, InterestError, InterestExtractor};
use interest_embeddings::{Embedding, EmbeddingError, EmbeddingModel, ModelInfo};
use interest_service::{sync_trigger_from_config, InferOptions, InterestPipeline, PipelineError};
use interest_sources::{
    BioSource, InMemoryBioSource, NoopSync, SourceError, SyncTrigger, UserBios,
};
use interest_types::{AggregatorConfig, ExtractorConfig, RankedInterests, SyncConfig};

const CATEGORIES: [&str; 5] = ["rust", "python", "privacy", "ipfs", "cryptography"];

/// Counts vocabulary words; fails on texts containing "explode".
struct KeywordModel {
    info: ModelInfo,
}

impl KeywordModel {
    fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "keyword-test".to_string(),
                dimension: CATEGORIES.len(),
                max_sequence_length: 512,
            },
        }
    }
}

impl EmbeddingModel for KeywordModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let lower = text.to_lowercase();
        if lower.contains("explode") {
            return Err(EmbeddingError::InvalidInput("backend fault".to_string()));
        }
        Ok(Embedding::new(
            CATEGORIES
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect(),
        ))
    }
}

#[derive(Default)]
struct RecordingSync {
    calls: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl SyncTrigger for RecordingSync {
    async fn sync_followings(&self, user_id: &str) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push(user_id.to_string());
        if self.fail {
            return Err(SourceError::Status {
                status: 503,
                body: "sync unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Wraps a bio source and counts lookups.
struct CountingSource {
    inner: InMemoryBioSource,
    lookups: AtomicUsize,
}

#[async_trait]
impl BioSource for CountingSource {
    async fn lookup(&self, user_id: &str) -> Result<Option<UserBios>, SourceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(user_id).await
    }
}

fn graph() -> InMemoryBioSource {
    let mut source = InMemoryBioSource::new();
    source
        .insert_user("alice", Some("rust and ipfs"), &["bob", "carol", "ghost"])
        .insert_user("bob", Some("privacy maximalist"), &[])
        .insert_user("carol", Some("privacy and cryptography"), &[])
        .insert_user("loner", Some("python"), &[])
        .insert_user("boom", Some("explode"), &[]);
    source
}

fn extractor() -> Arc<InterestExtractor> {
    let config = ExtractorConfig {
        model: "keyword-test".to_string(),
        categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        ..ExtractorConfig::default()
    };
    Arc::new(InterestExtractor::with_model(&config, Arc::new(KeywordModel::new())).unwrap())
}

fn aggregator() -> Arc<InterestAggregator> {
    Arc::new(InterestAggregator::new(&AggregatorConfig::default()).unwrap())
}

fn pipeline_with(
    bios: Arc<dyn BioSource>,
    sync: Arc<dyn SyncTrigger>,
) -> InterestPipeline {
    InterestPipeline::new(extractor(), aggregator(), bios, sync)
}

#[tokio::test]
async fn test_infer_ranks_network_and_self() {
    let sync = Arc::new(RecordingSync::default());
    let pipeline = pipeline_with(Arc::new(graph()), sync.clone());

    let report = pipeline.infer("Alice").await.unwrap();

    assert_eq!(report.username, "alice");
    assert_eq!(report.model, "keyword-test");
    assert_eq!(report.followings_count, 3);
    assert_eq!(*sync.calls.lock().unwrap(), vec!["alice".to_string()]);
    // followings: privacy x2, cryptography x1; self: rust, ipfs
    assert_eq!(
        report.interests,
        RankedInterests::Labels(vec![
            "privacy".to_string(),
            "cryptography".to_string(),
            "rust".to_string(),
            "ipfs".to_string(),
        ])
    );
}

#[tokio::test]
async fn test_infer_with_scores() {
    let pipeline = pipeline_with(Arc::new(graph()), Arc::new(NoopSync));
    let options = InferOptions {
        top_n: Some(2),
        return_scores: Some(true),
    };

    let report = pipeline.infer_with("alice", options).await.unwrap();
    match report.interests {
        RankedInterests::Scored(scored) => {
            assert_eq!(scored.len(), 2);
            assert_eq!(scored[0].category, "privacy");
            assert!((scored[0].score - (2.0 / 3.0) * 0.8).abs() < 1e-9);
            assert_eq!(scored[1].category, "cryptography");
            assert!((scored[1].score - (1.0 / 3.0) * 0.8).abs() < 1e-9);
        }
        RankedInterests::Labels(_) => panic!("Expected scored interests"),
    }
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let sync = Arc::new(RecordingSync::default());
    let pipeline = pipeline_with(Arc::new(graph()), sync.clone());

    let err = pipeline.infer("nobody").await.unwrap_err();
    assert!(matches!(err, PipelineError::UserNotFound(ref user) if user == "nobody"));
    // Sync still runs before the lookup
    assert_eq!(sync.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_followings_uses_own_bio() {
    let pipeline = pipeline_with(Arc::new(graph()), Arc::new(NoopSync));

    let report = pipeline.infer("loner").await.unwrap();
    assert_eq!(report.followings_count, 0);
    assert_eq!(report.interests.categories(), vec!["python"]);
}

#[tokio::test]
async fn test_sync_failure_stops_before_lookup() {
    let source = Arc::new(CountingSource {
        inner: graph(),
        lookups: AtomicUsize::new(0),
    });
    let sync = Arc::new(RecordingSync {
        fail: true,
        ..RecordingSync::default()
    });
    let pipeline = pipeline_with(source.clone(), sync);

    let err = pipeline.infer("alice").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Sync(SourceError::Status { status: 503, .. })
    ));
    assert_eq!(source.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embedding_failure_propagates() {
    let pipeline = pipeline_with(Arc::new(graph()), Arc::new(NoopSync));

    let err = pipeline.infer("boom").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Interest(InterestError::Embedding(_))
    ));
}

#[tokio::test]
async fn test_http_sync_runs_before_lookup() {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sync"))
        .and(body_json(serde_json::json!({"userName": "alice"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sync_config = SyncConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..SyncConfig::default()
    };
    let sync = sync_trigger_from_config(&sync_config).unwrap();
    let pipeline = pipeline_with(Arc::new(graph()), sync);

    let report = pipeline.infer("ALICE").await.unwrap();
    assert_eq!(report.interests.categories()[0], "privacy");
}

#[tokio::test]
async fn test_disabled_sync_skips_http() {
    let sync_config = SyncConfig {
        enabled: false,
        base_url: "http://127.0.0.1:9".to_string(),
        ..SyncConfig::default()
    };
    let sync = sync_trigger_from_config(&sync_config).unwrap();
    let pipeline = pipeline_with(Arc::new(graph()), sync);

    assert!(pipeline.infer("alice").await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_pipeline_is_deterministic_across_tasks() {
    let pipeline = pipeline_with(Arc::new(graph()), Arc::new(NoopSync));
    let expected = pipeline.infer("alice").await.unwrap().interests;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.infer("alice").await.unwrap().interests })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_extraction_window_limits_network_categories() {
    // ipfs clears the threshold but sits third in the ranking, outside a
    // window of two, so it never reaches the aggregator.
    let mut source = InMemoryBioSource::new();
    source
        .insert_user("dana", None, &["erin"])
        .insert_user("erin", Some("rust rust rust python python ipfs"), &[]);

    let config = ExtractorConfig {
        model: "keyword-test".to_string(),
        categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        similarity_threshold: 0.2,
        top_n: 2,
    };
    let extractor =
        Arc::new(InterestExtractor::with_model(&config, Arc::new(KeywordModel::new())).unwrap());
    let pipeline = InterestPipeline::new(
        extractor,
        aggregator(),
        Arc::new(source),
        Arc::new(NoopSync),
    );

    let report = pipeline.infer("dana").await.unwrap();
    assert_eq!(report.interests.categories(), vec!["rust", "python"]);
}

#[tokio::test]
async fn test_zero_top_n_override_is_rejected() {
    let pipeline = pipeline_with(Arc::new(graph()), Arc::new(NoopSync));
    let options = InferOptions {
        top_n: Some(0),
        return_scores: Some(true),
    };

    let err = pipeline.infer_with("alice", options).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Interest(InterestError::InvalidInput(_))
    ));
}
