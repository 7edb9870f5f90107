//! Interest CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (analyze, extract)

pub mod cli;
pub mod commands;

pub use cli::{AnalyzeArgs, Cli, Commands, ExtractArgs};
pub use commands::{exit_code, init_logging, run_analyze, run_extract};
