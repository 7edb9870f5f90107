//! Bio Interest Inference
//!
//! # Usage
//!
//! ```bash
//! interest-infer analyze <USERNAME> [--model M] [--verbose] [--scores] [--snapshot PATH]
//! interest-infer extract <BIO> [--top-n N] [--threshold T] [--scores]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/bio-interest/config.toml)
//! 3. Environment variables (INTEREST_*)
//! 4. CLI flags

use std::process::ExitCode;

use clap::Parser;

use interest_cli::{exit_code, run_analyze, run_extract, Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => {
            run_analyze(cli.config.as_deref(), cli.log_level.as_deref(), args).await
        }
        Commands::Extract(args) => {
            run_extract(cli.config.as_deref(), cli.log_level.as_deref(), args).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
