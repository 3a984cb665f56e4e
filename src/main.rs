//! Schema Enricher - Command-line tool adding schema attributes to Rust model sources.
//!
//! The tool rewrites the Rust files below a source directory in place. Every struct, named
//! field and getter gets a `#[schema(...)]` attribute whose title and description come from
//! the doc comment and whose constraints come from validation attributes such as
//! `#[not_empty]` or `#[column(length = 64)]`. Existing schema attributes are updated.
//!
//! # Usage
//!
//! ```bash
//! schema-enricher --source-path <DIR> [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Enrich all model files:
//! ```bash
//! schema-enricher --source-path ./src --includes 'model/**'
//! ```
//!
//! Describe associations as links:
//! ```bash
//! schema-enricher --source-path ./src --hateoas
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! schema-enricher --source-path ./src -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use schema_enricher::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse_from(cli::normalize_legacy_args(std::env::args_os()));

    // Initialize logger based on verbose flag
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Schema Enricher starting...");

    // Validate the parsed arguments
    let args = cli::parse_args_from_parsed(args)?;

    // Run the main workflow
    cli::run(args)?;

    Ok(())
}
