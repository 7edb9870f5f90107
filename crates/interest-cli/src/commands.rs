//! Command implementations for `interest-infer`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use interest_core::{CategoryMatch, InterestExtractor};
use interest_service::{InferOptions, InterestPipeline, InterestReport, PipelineError};
use interest_sources::InMemoryBioSource;
use interest_types::{validate_threshold, validate_top_n, RankedInterests, Settings};

use crate::cli::{AnalyzeArgs, ExtractArgs};

/// Exit code for a user the bio source does not know.
pub const EXIT_NOT_FOUND: u8 = 2;

/// Exit code for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Map a command failure to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::UserNotFound(_)) => EXIT_NOT_FOUND,
        _ => EXIT_FAILURE,
    }
}

/// Apply `analyze` flags on top of loaded settings.
pub fn apply_analyze_overrides(settings: &mut Settings, args: &AnalyzeArgs, log_level: Option<&str>) {
    if let Some(model) = &args.model {
        settings.extractor.model = model.clone();
    }
    if let Some(snapshot) = &args.snapshot {
        settings.snapshot_path = Some(snapshot.clone());
    }
    if args.no_sync {
        settings.sync.enabled = false;
    }
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    if args.verbose {
        settings.log_level = "debug".to_string();
    }
}

/// Open the follow-graph snapshot named in the settings.
pub async fn open_bio_source(settings: &Settings) -> Result<InMemoryBioSource> {
    let path = settings
        .snapshot_path
        .as_deref()
        .context("No bio source configured: pass --snapshot or set snapshot_path")?;
    InMemoryBioSource::load(Path::new(path))
        .await
        .with_context(|| format!("Failed to load snapshot {path}"))
}

/// Run the full pipeline for one user and print the report.
pub async fn run_analyze(
    config_path: Option<&str>,
    log_level: Option<&str>,
    args: AnalyzeArgs,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_analyze_overrides(&mut settings, &args, log_level);
    init_logging(&settings.log_level)?;
    settings.validate().context("Invalid configuration")?;

    if let Some(model) = &args.model {
        info!(model = %model, "Using model override");
    }

    let bios = open_bio_source(&settings).await?;
    let pipeline = InterestPipeline::from_settings(&settings, Arc::new(bios)).await?;

    let options = InferOptions {
        top_n: args.top_n,
        return_scores: args.scores.then_some(true),
    };
    let report = pipeline.infer_with(&args.username, options).await?;

    print!("{}", render_report(&report, settings.sync.enabled));
    Ok(())
}

/// Match one bio against the taxonomy and print the categories.
pub async fn run_extract(
    config_path: Option<&str>,
    log_level: Option<&str>,
    args: ExtractArgs,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(model) = &args.model {
        settings.extractor.model = model.clone();
    }
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    init_logging(&settings.log_level)?;
    settings.extractor.validate().context("Invalid configuration")?;
    if let Some(top_n) = args.top_n {
        validate_top_n(top_n).context("Invalid --top-n")?;
    }
    if let Some(threshold) = args.threshold {
        validate_threshold(threshold).context("Invalid --threshold")?;
    }

    let config = settings.extractor.clone();
    let cache_dir = settings.model_cache_path();
    let bio = args.bio.clone();
    let matches = tokio::task::spawn_blocking(move || -> Result<Vec<CategoryMatch>> {
        let extractor = InterestExtractor::load(&config, cache_dir.as_deref())?;
        Ok(extractor.extract_scored_with(&bio, args.top_n, args.threshold)?)
    })
    .await
    .context("Extraction task failed")??;

    print!("{}", render_matches(&matches, args.scores));
    Ok(())
}

fn seconds(duration: Duration) -> String {
    format!("{:.2} seconds", duration.as_secs_f64())
}

/// Human-readable report: stage timings, then the ranking.
pub fn render_report(report: &InterestReport, sync_enabled: bool) -> String {
    let timings = &report.timings;
    let mut out = String::new();
    if sync_enabled {
        out.push_str(&format!("Sync completed in {}\n", seconds(timings.sync)));
    } else {
        out.push_str("Sync skipped\n");
    }
    out.push_str(&format!("{} followings fetched\n", report.followings_count));
    out.push_str(&format!("Data fetch took {}\n", seconds(timings.fetch)));
    out.push_str(&format!("Extracted interests using model {}\n", report.model));
    out.push_str(&format!(
        "Interest extraction for user and all followings took {}\n",
        seconds(timings.extract)
    ));
    out.push_str(&format!("Aggregation completed in {}\n", seconds(timings.aggregate)));
    out.push_str(&format!("Top interests for @{}:\n", report.username));
    out.push_str(&render_interests(&report.interests));
    out.push_str(&format!("Total execution time: {}\n", seconds(timings.total)));
    out
}

/// One numbered line per interest; scores to four decimals when present.
pub fn render_interests(interests: &RankedInterests) -> String {
    if interests.is_empty() {
        return "  (none)\n".to_string();
    }
    match interests {
        RankedInterests::Labels(labels) => labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("  {}. {}\n", i + 1, label))
            .collect(),
        RankedInterests::Scored(scored) => scored
            .iter()
            .enumerate()
            .map(|(i, s)| format!("  {}. {} ({:.4})\n", i + 1, s.category, s.score))
            .collect(),
    }
}

pub fn render_matches(matches: &[CategoryMatch], with_scores: bool) -> String {
    if matches.is_empty() {
        return "No matching categories\n".to_string();
    }
    matches
        .iter()
        .map(|m| {
            if with_scores {
                format!("{}\t{:.4}\n", m.category, m.similarity)
            } else {
                format!("{}\n", m.category)
            }
        })
        .collect()
}
