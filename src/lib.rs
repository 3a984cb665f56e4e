//! Schema Enricher - Schema attributes for Rust model sources.
//!
//! This library rewrites Rust source files in place, adding or updating a
//! `#[schema(description = "...", title = "...", ...)]` attribute on every struct, its named
//! fields and its getters. Titles and descriptions come from doc comments; constraints such as
//! required-ness, lengths and value ranges come from validation and persistence attributes
//! (`#[not_empty]`, `#[not_null]`, `#[min]`, `#[max]`, `#[column]`, `#[size]`, `#[validate]`).
//! In link mode, associations to other entities are described as URIs.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans the source directory for Rust files
//! 2. [`parser`] - Parses Rust source files into Abstract Syntax Trees (AST)
//! 3. [`doc_comment`] - Splits doc comments into summary and description
//! 4. [`attributes`] - Typed access to attribute arguments
//! 5. [`constraints`] - Maps validation attributes to constraints
//! 6. [`imports`] and [`type_resolver`] - Locate the declarations of referenced types
//! 7. [`classifier`] - Decides whether a property is a value or an association
//! 8. [`narrator`] - Association wording for link mode
//! 9. [`synthesizer`] and [`annotation`] - Build the schema attribute
//! 10. [`rewrite`] - Splices attributes into the source text
//! 11. [`enricher`] - Drives the run over all files
//! 12. [`descriptions`] - Optional catalogue of texts for undocumented declarations
//!
//! # Example Usage
//!
//! ```no_run
//! use schema_enricher::enricher::{Enricher, EnricherOptions};
//! use std::path::PathBuf;
//!
//! let options = EnricherOptions {
//!     includes: vec!["model/**".to_string()],
//!     hateoas: true,
//!     ..Default::default()
//! };
//! let summary = Enricher::new(PathBuf::from("./src"), options).enrich().unwrap();
//! println!("Enriched {} declarations", summary.declarations_enriched);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod annotation;
pub mod attributes;
pub mod classifier;
pub mod cli;
pub mod constraints;
pub mod descriptions;
pub mod doc_comment;
pub mod enricher;
pub mod error;
pub mod imports;
pub mod narrator;
pub mod parser;
pub mod rewrite;
pub mod scanner;
pub mod synthesizer;
pub mod type_resolver;
