//! foxmlgen - assemble a FOXML ingest batch from catalog rows

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use foxmlgen::{
    assemble, read_rows, write_batch_output, Arrangement, BatchConfig, Collection, DirectoryWriter,
    DurationMode, FileSource, IdentifierLedger, MediaType, RightsScheme, TemplateSet,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "foxmlgen")]
#[command(author, version, about = "Assemble FOXML records and manifests from catalog rows")]
struct Cli {
    /// Catalog rows (headed CSV)
    #[arg(short, long)]
    data: PathBuf,

    /// Reserved identifiers: an allocation answer or a previous pids.txt
    #[arg(short, long)]
    pids: PathBuf,

    /// Directory holding umam.xml, umdm.xml, mets.xml and metsA/B/C.xml
    #[arg(short, long, default_value = "templates")]
    templates: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// JSON batch configuration; flags below override it
    #[arg(short, long, env = "FOXMLGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Row arrangement: S(ingle) or M(ulti)
    #[arg(long)]
    arrangement: Option<Arrangement>,

    /// Rights scheme: P(ublic), R(estricted), C(ampus only) or M(ediated)
    #[arg(long)]
    rights: Option<RightsScheme>,

    /// Media type: A(udio) or V(ideo)
    #[arg(long)]
    media: Option<MediaType>,

    /// Collection: D(igital collections), F(ilms@UM) or a literal identifier
    #[arg(long)]
    collection: Option<Collection>,

    /// Duration format: M(inutes) or I(SO-style hh:mm:ss)
    #[arg(long)]
    duration_format: Option<DurationMode>,

    /// Structural-map ID offset for the first child of each group
    #[arg(long)]
    order_base: Option<u32>,

    /// Fixed batch timestamp, for reproducible output
    #[arg(long)]
    timestamp: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn batch_config(&self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => BatchConfig::default(),
        };

        if let Some(arrangement) = self.arrangement {
            config.arrangement = arrangement;
        }
        if let Some(rights) = self.rights {
            config.rights = rights;
        }
        if let Some(media) = self.media {
            config.media_type = media;
        }
        if let Some(collection) = &self.collection {
            config.collection = collection.clone();
        }
        if let Some(mode) = self.duration_format {
            config.duration_mode = mode;
        }
        if let Some(base) = self.order_base {
            config.order_base = base;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.batch_config()?;
    info!(
        arrangement = %config.arrangement,
        rights = %config.rights,
        media = %config.media_type,
        collection = %config.collection,
        duration = %config.duration_mode,
        "Batch configuration"
    );

    let data = File::open(&cli.data)
        .with_context(|| format!("Failed to open {}", cli.data.display()))?;
    let rows = read_rows(data).with_context(|| format!("Failed to read rows from {}", cli.data.display()))?;

    let templates = TemplateSet::from_dir(&cli.templates)
        .with_context(|| format!("Failed to load templates from {}", cli.templates.display()))?;

    let needed = config.arrangement.identifiers_needed(rows.len());
    let mut source = FileSource::new(&cli.pids);
    let mut ledger = IdentifierLedger::load(&mut source, needed)
        .with_context(|| format!("Failed to load identifiers from {}", cli.pids.display()))?;

    let timestamp = cli
        .timestamp
        .clone()
        .unwrap_or_else(|| foxmlgen::assembly::timestamp(Utc::now()));
    let output = assemble(rows, &mut ledger, &templates, &config, &timestamp)
        .context("Batch assembly failed; no files were written")?;

    let mut writer = DirectoryWriter::new(&cli.output);
    write_batch_output(&mut writer, &output)
        .with_context(|| format!("Failed to write batch to {}", cli.output.display()))?;

    info!(
        records = output.records().len(),
        parents = output.parent_pids().len(),
        output = %cli.output.display(),
        "Batch complete"
    );
    Ok(())
}
