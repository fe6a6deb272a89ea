//! Error types for batch assembly.
//!
//! This module provides the [`FoxmlError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Every variant is fatal to the batch. Identifier-to-file correspondence must
//! stay exact, so no operation recovers or retries.

use thiserror::Error;

/// Error type for all batch assembly operations.
///
/// Variants are grouped by when they can occur: configuration errors before a
/// batch starts, supply errors during the pre-flight check, row errors while
/// the row stream is consumed, and rendering errors while a record is produced.
#[derive(Error, Debug)]
pub enum FoxmlError {
    /// An invalid batch-level selection (rights scheme, duration format, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The identifier pool cannot cover the computed requirement.
    #[error("Not enough identifiers for this batch: {needed} needed, {available} available")]
    InsufficientIdentifiers {
        /// Identifiers the batch will consume
        needed: usize,
        /// Identifiers still unissued in the ledger
        available: usize,
    },

    /// An identifier was requested after the ledger ran dry.
    #[error("Identifier ledger exhausted after issuing {issued} identifiers")]
    LedgerExhausted {
        /// Identifiers issued before the failing request
        issued: usize,
    },

    /// A duration string that is not `HH:MM:SS`.
    #[error("Malformed duration {value:?}: {reason}")]
    MalformedDuration {
        /// The raw duration text
        value: String,
        /// What was wrong with it
        reason: String,
    },

    /// A child row arrived while no parent group was open.
    #[error("Line {line}: child row has no open parent group")]
    OrphanChild {
        /// Line number of the child row
        line: usize,
    },

    /// A row lacks a column the active templates require.
    #[error("Line {line}: missing required field {field:?}")]
    MissingField {
        /// Line number of the row
        line: usize,
        /// Name of the missing column
        field: String,
    },

    /// A field value that cannot be turned into markup.
    #[error("Line {line}: malformed {field:?} value {value:?}: {reason}")]
    MalformedField {
        /// Line number of the row
        line: usize,
        /// Name of the column
        field: String,
        /// The offending value
        value: String,
        /// What was wrong with it
        reason: String,
    },

    /// The row kind discriminator is neither parent nor child.
    #[error("Line {line}: unknown record type {value:?}")]
    UnknownRowKind {
        /// Line number of the row
        line: usize,
        /// The discriminator text
        value: String,
    },

    /// A placeholder token survived the substitution pass.
    #[error("Record {record}: unresolved placeholder {token}")]
    UnresolvedPlaceholder {
        /// Identifier of the record being rendered
        record: String,
        /// The surviving token, delimiters included
        token: String,
    },

    /// Error while building an XML block.
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// Error reading rows or writing summary lines.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error reading a JSON configuration file.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`FoxmlError`].
pub type Result<T> = std::result::Result<T, FoxmlError>;
