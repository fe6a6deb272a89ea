//! The pool of pre-reserved record identifiers.
//!
//! Identifiers are allocated upstream and handed over as a document, either the
//! XML answer of the allocation service (`<pid>umd:123</pid>` entries) or a
//! plain list with one identifier per line, like the `pids.txt` manifest a
//! previous run wrote. [`IdentifierLedger`] issues them strictly in order.
//!
//! # Examples
//!
//! ```
//! use foxmlgen::ledger::IdentifierLedger;
//!
//! let mut ledger = IdentifierLedger::from_document(
//!     "<pidList><pid>umd:1</pid><pid>umd:2</pid></pidList>",
//! );
//! ledger.reserve(2)?;
//! assert_eq!(ledger.next_identifier()?, "umd:1");
//! assert_eq!(ledger.remaining(), 1);
//! # Ok::<(), foxmlgen::FoxmlError>(())
//! ```

use std::fmt::Debug;
use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{FoxmlError, Result};

lazy_static! {
    static ref PID_TOKEN: Regex = Regex::new(r"<pid>(.*?)</pid>").expect("valid pid pattern");
}

/// Extract identifiers from an allocation document, in document order.
///
/// Documents with `<pid>` markup yield the tagged values. A document without
/// any markup is read as a plain list, one identifier per non-blank line.
#[must_use]
pub fn parse_identifiers(document: &str) -> Vec<String> {
    if document.contains('<') {
        PID_TOKEN
            .captures_iter(document)
            .map(|caps| caps[1].trim().to_string())
            .collect()
    } else {
        document
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Supplier of identifier documents.
///
/// Implementations fetch a document for at least `count` identifiers. The
/// allocation service transport lives outside this crate; [`FileSource`]
/// covers identifiers saved to disk.
pub trait IdentifierSource: Debug {
    /// Fetch a document listing identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be obtained.
    fn fetch(&mut self, count: usize) -> Result<String>;
}

/// Identifiers previously saved to a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Read identifiers from `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileSource { path: path.into() }
    }
}

impl IdentifierSource for FileSource {
    fn fetch(&mut self, count: usize) -> Result<String> {
        tracing::debug!(path = %self.path.display(), count, "Loading identifiers from file");
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

/// Ordered identifiers plus a cursor marking the next unissued entry.
#[derive(Debug, Clone, Default)]
pub struct IdentifierLedger {
    identifiers: Vec<String>,
    cursor: usize,
}

impl IdentifierLedger {
    /// Create a ledger from identifiers in issuance order.
    #[must_use]
    pub fn new(identifiers: Vec<String>) -> Self {
        IdentifierLedger {
            identifiers,
            cursor: 0,
        }
    }

    /// Create a ledger from an allocation document.
    ///
    /// See [`parse_identifiers`] for the accepted formats.
    #[must_use]
    pub fn from_document(document: &str) -> Self {
        Self::new(parse_identifiers(document))
    }

    /// Fetch a document for `count` identifiers and build a ledger from it.
    ///
    /// # Errors
    ///
    /// Returns any error from the source.
    pub fn load<S: IdentifierSource + ?Sized>(source: &mut S, count: usize) -> Result<Self> {
        let ledger = Self::from_document(&source.fetch(count)?);
        tracing::info!(loaded = ledger.len(), requested = count, "Loaded identifiers");
        Ok(ledger)
    }

    /// Pre-flight check that `needed` identifiers are still unissued.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::InsufficientIdentifiers`] when the pool is short.
    pub fn reserve(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if available < needed {
            return Err(FoxmlError::InsufficientIdentifiers { needed, available });
        }
        Ok(())
    }

    /// Issue the identifier at the cursor and advance it.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::LedgerExhausted`] once every identifier is issued.
    pub fn next_identifier(&mut self) -> Result<String> {
        let identifier = self
            .identifiers
            .get(self.cursor)
            .cloned()
            .ok_or(FoxmlError::LedgerExhausted {
                issued: self.cursor,
            })?;
        self.cursor += 1;
        Ok(identifier)
    }

    /// Identifiers issued so far, in issuance order.
    #[must_use]
    pub fn issued(&self) -> &[String] {
        &self.identifiers[..self.cursor]
    }

    /// Identifiers not yet issued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.identifiers.len() - self.cursor
    }

    /// Total identifiers held, issued or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Whether the ledger holds no identifiers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_ANSWER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pidList xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <pid>umd:1001</pid>
  <pid>umd:1002</pid><pid>umd:1003</pid>
</pidList>"#;

    #[test]
    fn test_parse_tagged_document() {
        assert_eq!(
            parse_identifiers(SERVER_ANSWER),
            vec!["umd:1001", "umd:1002", "umd:1003"]
        );
    }

    #[test]
    fn test_parse_plain_list() {
        let manifest = "umd:1001\numd:1002\n\numd:1003";
        assert_eq!(
            parse_identifiers(manifest),
            vec!["umd:1001", "umd:1002", "umd:1003"]
        );
    }

    #[test]
    fn test_markup_without_pids_yields_nothing() {
        assert!(parse_identifiers("<html><body>Unauthorized</body></html>").is_empty());
    }

    #[test]
    fn test_issue_in_order() {
        let mut ledger = IdentifierLedger::from_document(SERVER_ANSWER);
        assert_eq!(ledger.next_identifier().unwrap(), "umd:1001");
        assert_eq!(ledger.next_identifier().unwrap(), "umd:1002");
        assert_eq!(ledger.issued(), ["umd:1001", "umd:1002"]);
        assert_eq!(ledger.remaining(), 1);
    }

    #[test]
    fn test_reserve_shortfall() {
        let ledger = IdentifierLedger::from_document(SERVER_ANSWER);
        match ledger.reserve(5) {
            Err(FoxmlError::InsufficientIdentifiers { needed, available }) => {
                assert_eq!(needed, 5);
                assert_eq!(available, 3);
            },
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ledger.reserve(3).is_ok());
    }

    #[test]
    fn test_exhaustion() {
        let mut ledger = IdentifierLedger::new(vec!["umd:1".to_string()]);
        ledger.next_identifier().unwrap();
        assert!(matches!(
            ledger.next_identifier(),
            Err(FoxmlError::LedgerExhausted { issued: 1 })
        ));
        assert_eq!(ledger.remaining(), 0);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pids.xml");
        std::fs::write(&path, SERVER_ANSWER).unwrap();

        let mut source = FileSource::new(&path);
        let ledger = IdentifierLedger::load(&mut source, 3).unwrap();
        assert_eq!(ledger.len(), 3);
    }
}
