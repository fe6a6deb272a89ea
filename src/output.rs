//! Rendered records and the manifests of a finished batch.
//!
//! [`BatchOutput`] is the accumulated result of assembly. It holds every
//! rendered record in emission order, every identifier issued, the parent
//! identifiers, and one summary line per record in input-row order. Nothing
//! in it touches storage; see [`crate::writer`] for that.

use crate::error::{FoxmlError, Result};
use crate::row::RowKind;

/// File name of the manifest listing every issued identifier.
pub const PIDS_MANIFEST: &str = "pids.txt";
/// File name of the manifest listing parent identifiers.
pub const PARENT_PIDS_MANIFEST: &str = "UMDMpids.txt";
/// File name of the summary manifest.
pub const LINKS_MANIFEST: &str = "links.txt";

/// One finished XML record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecord {
    /// Identifier assigned to the record
    pub pid: String,
    /// Parent or child
    pub kind: RowKind,
    /// The XML text, blank lines removed
    pub content: String,
}

impl RenderedRecord {
    /// Storage-safe file stem: the identifier with `:` replaced by `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use foxmlgen::output::RenderedRecord;
    /// use foxmlgen::row::RowKind;
    ///
    /// let record = RenderedRecord {
    ///     pid: "umd:1042".to_string(),
    ///     kind: RowKind::Child,
    ///     content: String::new(),
    /// };
    /// assert_eq!(record.file_stem(), "umd_1042");
    /// ```
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.pid.replace(':', "_")
    }

    /// File name the record is stored under.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.xml", self.file_stem())
    }
}

/// Summary entry for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    /// Human label, the row's `Identifier` column
    pub label: String,
    /// Parent or child
    pub kind: RowKind,
    /// Identifier assigned to the record
    pub pid: String,
    /// Public access URL (parents only)
    pub access_url: Option<String>,
}

impl SummaryLine {
    fn fields(&self) -> Vec<&str> {
        let mut fields = vec![self.label.as_str(), self.kind.label(), self.pid.as_str()];
        if let Some(url) = &self.access_url {
            fields.push(url);
        }
        fields
    }
}

/// Everything a batch produced, ready to be stored.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    records: Vec<RenderedRecord>,
    issued: Vec<String>,
    parents: Vec<String>,
    summary: Vec<SummaryLine>,
}

impl BatchOutput {
    /// Create an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn issue(&mut self, pid: &str) {
        self.issued.push(pid.to_string());
    }

    pub(crate) fn push_record(&mut self, record: RenderedRecord) {
        if record.kind == RowKind::Parent {
            self.parents.push(record.pid.clone());
        }
        self.records.push(record);
    }

    pub(crate) fn push_summary(&mut self, line: SummaryLine) {
        self.summary.push(line);
    }

    /// Rendered records in emission order.
    ///
    /// A child is emitted as soon as its row is read; its parent follows once
    /// the group closes.
    #[must_use]
    pub fn records(&self) -> &[RenderedRecord] {
        &self.records
    }

    /// Every identifier issued, in issuance order.
    #[must_use]
    pub fn issued(&self) -> &[String] {
        &self.issued
    }

    /// Identifiers of parent records, in emission order.
    #[must_use]
    pub fn parent_pids(&self) -> &[String] {
        &self.parents
    }

    /// Summary lines in input-row order.
    #[must_use]
    pub fn summary(&self) -> &[SummaryLine] {
        &self.summary
    }

    /// Text of the identifier manifest, one identifier per line.
    #[must_use]
    pub fn pids_text(&self) -> String {
        lines(&self.issued)
    }

    /// Text of the parent-identifier manifest.
    #[must_use]
    pub fn parent_pids_text(&self) -> String {
        lines(&self.parents)
    }

    /// Text of the summary manifest: fully quoted CSV, no header.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::CsvError`] if a line cannot be encoded.
    pub fn links_text(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(Vec::new());
        for line in &self.summary {
            writer.write_record(line.fields())?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| FoxmlError::IoError(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn lines(items: &[String]) -> String {
    let mut text = String::new();
    for item in items {
        text.push_str(item);
        text.push('\n');
    }
    text
}
