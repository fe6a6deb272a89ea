//! Catalog rows: one mapping of column name to raw text per input line.
//!
//! The order of the rows handed to the assembler is the contract for output
//! order. A parent row is followed by its child rows, and nothing is sorted
//! or regrouped.

use std::io::Read;

use indexmap::IndexMap;

use crate::error::{FoxmlError, Result};

/// Column holding the parent/child discriminator in multi-row data.
pub const KIND_FIELD: &str = "XMLType";

/// Role of a row in multi-row data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Descriptive record for one intellectual unit (`UMDM`)
    Parent,
    /// Technical record for one digitized file (`UMAM`)
    Child,
}

impl RowKind {
    /// Label used in summary lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Parent => "UMDM",
            Self::Child => "UMAM",
        }
    }
}

/// One input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    line: usize,
    fields: IndexMap<String, String>,
}

impl Row {
    /// Create an empty row for the given input line.
    #[must_use]
    pub fn new(line: usize) -> Self {
        Row {
            line,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any existing value.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    /// Input line this row came from (1-based, header included).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// A required field.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::MissingField`] if the column is absent. An empty
    /// cell is present and returns `""`.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| FoxmlError::MissingField {
                line: self.line,
                field: name.to_string(),
            })
    }

    /// An optional field: `None` when the column is absent or blank.
    #[must_use]
    pub fn get_opt(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Whether the column exists at all.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Classify the row from its `XMLType` column.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::MissingField`] without the column and
    /// [`FoxmlError::UnknownRowKind`] for values other than `UMDM`/`UMAM`.
    pub fn kind(&self) -> Result<RowKind> {
        let value = self.get(KIND_FIELD)?;
        match value.trim().to_uppercase().as_str() {
            "UMDM" => Ok(RowKind::Parent),
            "UMAM" => Ok(RowKind::Child),
            _ => Err(FoxmlError::UnknownRowKind {
                line: self.line,
                value: value.to_string(),
            }),
        }
    }

    /// Iterate fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Read every row of a headed CSV document.
///
/// Each row keeps its source line number for error reporting.
///
/// # Errors
///
/// Returns [`FoxmlError::CsvError`] for unreadable input or ragged rows.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map_or(index + 2, |p| usize::try_from(p.line()).unwrap_or(index + 2));
        let mut row = Row::new(line);
        for (name, value) in headers.iter().zip(record.iter()) {
            row.insert(name, value);
        }
        rows.push(row);
    }
    Ok(rows)
}
