use crate::descriptions::DescriptionCatalogue;
use crate::enricher::{EnrichSummary, Enricher, EnricherOptions};
use crate::error::Error;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::PathBuf;

/// Long options that used to be written with a single dash.
const LEGACY_OPTIONS: &[&str] = &[
    "-sourcePath",
    "-includes",
    "-excludes",
    "-hateoas",
    "-hateaos",
    "-hateaosHAL",
    "-descriptions",
];

/// Schema Enricher - Document model structs with schema attributes derived from doc comments
/// and validation attributes
#[derive(Parser, Debug)]
#[command(name = "schema-enricher")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Root directory of the sources to enrich
    #[arg(long = "source-path", alias = "sourcePath", value_name = "DIR")]
    pub source_path: PathBuf,

    /// Comma separated glob patterns of files to enrich
    #[arg(long = "includes", value_name = "GLOBS", value_delimiter = ',')]
    pub includes: Vec<String>,

    /// Comma separated glob patterns of files and directories to skip
    #[arg(long = "excludes", value_name = "GLOBS", value_delimiter = ',')]
    pub excludes: Vec<String>,

    /// Describe associations as links to other resources
    #[arg(long = "hateoas", aliases = ["hateaos", "hateaosHAL"])]
    pub hateoas: bool,

    /// YAML or JSON file with descriptions for undocumented declarations
    #[arg(long = "descriptions", value_name = "FILE")]
    pub descriptions: Option<PathBuf>,

    /// Key prefix of the description file entries
    #[arg(long = "descriptions-prefix", value_name = "PREFIX", requires = "descriptions")]
    pub descriptions_prefix: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Rewrites single-dash long options such as `-sourcePath` to their double-dash form.
pub fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.into_iter()
        .map(|arg| -> OsString { arg.into() })
        .map(|arg| {
            let legacy = arg.to_str().and_then(|s| {
                let (name, value) = match s.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (s, None),
                };
                LEGACY_OPTIONS.contains(&name).then(|| match value {
                    Some(value) => format!("-{}={}", name, value),
                    None => format!("-{}", name),
                })
            });
            legacy.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

/// Parse command line arguments
///
/// Usage errors make clap print a message and exit with status 2.
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse_from(normalize_legacy_args(std::env::args_os()));
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(mut args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    // Validate source path exists
    if !args.source_path.exists() {
        return Err(Error::InvalidArgument(format!(
            "Source path does not exist: {}",
            args.source_path.display()
        ))
        .into());
    }

    // Validate source path is a directory
    if !args.source_path.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "Source path is not a directory: {}",
            args.source_path.display()
        ))
        .into());
    }

    args.includes = trim_patterns(args.includes);
    args.excludes = trim_patterns(args.excludes);

    info!("Source path: {}", args.source_path.display());
    if !args.includes.is_empty() {
        info!("Includes: {}", args.includes.join(", "));
    }
    if !args.excludes.is_empty() {
        info!("Excludes: {}", args.excludes.join(", "));
    }
    info!(
        "Associations: {}",
        if args.hateoas { "links" } else { "embedded" }
    );
    if let Some(ref descriptions) = args.descriptions {
        info!("Descriptions: {}", descriptions.display());
    }

    Ok(args)
}

fn trim_patterns(patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<EnrichSummary> {
    info!("Starting schema enrichment...");

    let descriptions = match &args.descriptions {
        Some(path) => {
            let catalogue = DescriptionCatalogue::load(path, args.descriptions_prefix.as_deref())
                .with_context(|| format!("Failed to load descriptions from {}", path.display()))?;
            if catalogue.is_empty() {
                warn!("No descriptions found in {}", path.display());
            }
            Some(catalogue)
        }
        None => None,
    };

    let options = EnricherOptions {
        includes: args.includes,
        excludes: args.excludes,
        hateoas: args.hateoas,
        descriptions,
    };
    let enricher = Enricher::new(args.source_path, options);
    let summary = enricher.enrich()?;

    for warning in &summary.warnings {
        warn!("{}", warning);
    }

    info!("Enrichment complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", summary.files_scanned);
    info!("  - Files rewritten: {}", summary.files_rewritten);
    info!("  - Declarations enriched: {}", summary.declarations_enriched);

    Ok(summary)
}
