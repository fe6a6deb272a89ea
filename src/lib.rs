#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # foxmlgen: FOXML batch assembly
//!
//! Turns ordered catalog rows into FOXML records for repository ingest: one
//! descriptive parent record per object and one technical child record per
//! digitized file, plus the identifier and summary manifests of the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use foxmlgen::{assemble, read_rows, write_batch_output, BatchConfig, DirectoryWriter,
//!     FileSource, IdentifierLedger, TemplateSet};
//! use std::fs::File;
//!
//! # fn main() -> foxmlgen::Result<()> {
//! let config = BatchConfig::from_json_file("batch.json")?;
//! let rows = read_rows(File::open("rows.csv")?)?;
//! let templates = TemplateSet::from_dir("templates")?;
//!
//! let needed = config.arrangement.identifiers_needed(rows.len());
//! let mut ledger = IdentifierLedger::load(&mut FileSource::new("pids.xml"), needed)?;
//!
//! let timestamp = foxmlgen::assembly::timestamp(chrono::Utc::now());
//! let output = assemble(rows, &mut ledger, &templates, &config, &timestamp)?;
//! write_batch_output(&mut DirectoryWriter::new("out"), &output)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`assembly`] - the group state machine and batch entry point
//! - [`mets`] - structural map construction by anchor splicing
//! - [`render`] - single-pass placeholder substitution
//! - [`template`] - record templates and template sets
//! - [`tags`] - element wrapping for descriptive placeholders
//! - [`descriptive`] - composed descriptive blocks (agents, dates, subjects)
//! - [`technical`] - technical metadata block for child records
//! - [`duration`] - duration parsing in minutes or clock form
//! - [`ledger`] - reserved identifier pool
//! - [`row`] - catalog rows and CSV input
//! - [`config`] - batch presets and JSON configuration
//! - [`output`] - rendered records and manifests
//! - [`writer`] - storing a batch on disk
//! - [`escape`] - field text escaping
//! - [`error`] - error types

pub mod assembly;
pub mod config;
pub mod descriptive;
pub mod duration;
pub mod error;
pub mod escape;
pub mod ledger;
pub mod mets;
pub mod output;
pub mod render;
pub mod row;
pub mod tags;
pub mod technical;
pub mod template;
pub mod writer;

pub use assembly::{assemble, BatchAssembler};
pub use config::{Arrangement, BatchConfig, Collection, MediaType, RightsFlags, RightsScheme};
pub use duration::{DurationMode, RunTime};
pub use error::{FoxmlError, Result};
pub use ledger::{FileSource, IdentifierLedger, IdentifierSource};
pub use mets::{MetsTemplates, StructMapBuilder};
pub use output::{BatchOutput, RenderedRecord, SummaryLine};
pub use render::{PlaceholderMap, Substitution};
pub use row::{read_rows, Row, RowKind};
pub use tags::TagTable;
pub use template::{Template, TemplateSet};
pub use writer::{write_batch_output, DirectoryWriter, RecordWriter};
