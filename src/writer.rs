//! Storing a finished batch.
//!
//! [`RecordWriter`] is the storage boundary: it receives rendered records one
//! at a time and the batch manifests at the end. [`DirectoryWriter`] lays a
//! batch out on disk:
//!
//! ```text
//! <out>/foxml/umd_1001.xml
//! <out>/foxml/umd_1002.xml
//! <out>/pids.txt
//! <out>/UMDMpids.txt
//! <out>/links.txt
//! ```
//!
//! A batch is only handed to a writer once it has been fully assembled, so a
//! fatal row or rendering error never leaves partial output behind.
//!
//! # Examples
//!
//! ```no_run
//! use foxmlgen::output::BatchOutput;
//! use foxmlgen::writer::{write_batch_output, DirectoryWriter};
//!
//! # fn main() -> foxmlgen::Result<()> {
//! let output = BatchOutput::new();
//! let mut writer = DirectoryWriter::new("out");
//! write_batch_output(&mut writer, &output)?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FoxmlError, Result};
use crate::output::{BatchOutput, RenderedRecord, LINKS_MANIFEST, PARENT_PIDS_MANIFEST, PIDS_MANIFEST};

/// Subdirectory holding the XML records.
pub const RECORD_DIR: &str = "foxml";

/// Destination for the records and manifests of a batch.
///
/// Writers follow a fixed sequence: records via
/// [`write_record`](Self::write_record) or [`write_batch`](Self::write_batch),
/// then [`write_manifests`](Self::write_manifests), then
/// [`finish`](Self::finish).
pub trait RecordWriter: std::fmt::Debug {
    /// Store one rendered record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    fn write_record(&mut self, record: &RenderedRecord) -> Result<()>;

    /// Store several records, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`write_record`](Self::write_record).
    fn write_batch(&mut self, records: &[RenderedRecord]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Store the identifier, parent-identifier and summary manifests.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest cannot be encoded or stored.
    fn write_manifests(&mut self, output: &BatchOutput) -> Result<()>;

    /// Flush and close the destination. No writes are accepted afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if finalizing fails.
    fn finish(&mut self) -> Result<()>;

    /// Records stored so far, if the writer tracks them.
    fn records_written(&self) -> Option<usize> {
        None
    }
}

/// Store every record of `output`, then its manifests.
///
/// # Errors
///
/// Returns the first storage error. There is no retry.
pub fn write_batch_output<W: RecordWriter + ?Sized>(writer: &mut W, output: &BatchOutput) -> Result<()> {
    writer.write_batch(output.records())?;
    writer.write_manifests(output)?;
    writer.finish()?;
    tracing::info!(
        records = output.records().len(),
        identifiers = output.issued().len(),
        "Batch written"
    );
    Ok(())
}

/// Writes records and manifests under an output directory.
#[derive(Debug)]
pub struct DirectoryWriter {
    root: PathBuf,
    records_written: usize,
    finished: bool,
}

impl DirectoryWriter {
    /// Create a writer rooted at `root`. Directories are created on first use.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirectoryWriter {
            root: root.into(),
            records_written: 0,
            finished: false,
        }
    }

    /// Output root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a record is written to.
    #[must_use]
    pub fn record_path(&self, record: &RenderedRecord) -> PathBuf {
        self.root.join(RECORD_DIR).join(record.file_name())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(FoxmlError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "writer already finished",
            )));
        }
        Ok(())
    }
}

impl RecordWriter for DirectoryWriter {
    fn write_record(&mut self, record: &RenderedRecord) -> Result<()> {
        self.ensure_open()?;
        let path = self.record_path(record);
        if self.records_written == 0 {
            fs::create_dir_all(self.root.join(RECORD_DIR))?;
        }
        fs::write(&path, &record.content)?;
        self.records_written += 1;
        tracing::debug!(path = %path.display(), "Wrote record");
        Ok(())
    }

    fn write_manifests(&mut self, output: &BatchOutput) -> Result<()> {
        self.ensure_open()?;
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(PIDS_MANIFEST), output.pids_text())?;
        fs::write(self.root.join(PARENT_PIDS_MANIFEST), output.parent_pids_text())?;
        fs::write(self.root.join(LINKS_MANIFEST), output.links_text()?)?;
        tracing::info!(root = %self.root.display(), "Wrote manifests");
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}
