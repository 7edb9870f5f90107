//! CLI argument parsing for `interest-infer`.
//!
//! Flags override every other configuration source.

use clap::{Args, Parser, Subcommand};

/// Bio Interest Inference
///
/// Ranks a user's interests from their own bio and the bios of the
/// accounts they follow.
#[derive(Parser, Debug)]
#[command(name = "interest-infer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/bio-interest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a user's followings and infer their top interests
    Analyze(AnalyzeArgs),

    /// Match a single bio against the category taxonomy
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Username to analyze (case-insensitive)
    pub username: String,

    /// Override the embedding model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Print aggregated scores next to each interest
    #[arg(long)]
    pub scores: bool,

    /// Number of interests to report
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Follow-graph snapshot to read bios from
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Skip the follow-graph sync
    #[arg(long)]
    pub no_sync: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Bio text to match
    pub bio: String,

    /// Override the embedding model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of most similar categories to consider
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Minimum similarity, in (0, 1)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Print similarities next to each category
    #[arg(long)]
    pub scores: bool,
}
