//! The batch assembly engine.
//!
//! [`BatchAssembler`] consumes rows in input order and keeps at most one
//! object group open:
//!
//! - a parent row closes the open group (rendering its parent record) and opens
//!   a new one
//! - a child row is rendered at once, spliced into the open group's structural
//!   map and added to the group's run-time total
//! - a child row with no open group is an error
//! - the end of input closes the last group
//!
//! A parent record is therefore always emitted after its children, once the
//! structural map and the run-time total are complete.
//!
//! # Examples
//!
//! ```
//! use foxmlgen::assembly::assemble;
//! use foxmlgen::config::BatchConfig;
//! use foxmlgen::ledger::IdentifierLedger;
//! use foxmlgen::template::TemplateSet;
//!
//! let templates = TemplateSet::from_texts(
//!     "<umam/>",
//!     "<umdm>!!!INSERT_METS_HERE!!!</umdm>",
//!     "!!!Anchor-A!!!!!!Anchor-B!!!!!!Anchor-C!!!",
//!     ["<a/>", "<b/>", "<c/>"],
//! )?;
//! let mut ledger = IdentifierLedger::from_document("<pid>umd:1</pid>");
//!
//! // no rows, no records
//! let output = assemble(Vec::new(), &mut ledger, &templates, &BatchConfig::default(), "now")?;
//! assert!(output.records().is_empty());
//! # Ok::<(), foxmlgen::FoxmlError>(())
//! ```

use chrono::{DateTime, Utc};

use crate::config::{Arrangement, BatchConfig};
use crate::descriptive;
use crate::duration::RunTime;
use crate::error::{FoxmlError, Result};
use crate::ledger::IdentifierLedger;
use crate::mets::StructMapBuilder;
use crate::output::{BatchOutput, RenderedRecord, SummaryLine};
use crate::render::{tidy, token, PlaceholderMap};
use crate::row::{Row, RowKind};
use crate::tags::TagTable;
use crate::technical::technical_metadata;
use crate::template::{TemplateSet, METS_SLOT};

/// Column holding a child's raw `HH:MM:SS` run time.
pub const DURATION_FIELD: &str = "DurationDerivatives";

/// Format a batch timestamp: UTC with microseconds, e.g.
/// `2024-03-05T14:07:09.123456Z`.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// One parent unit while its children are being read.
#[derive(Debug)]
struct ObjectGroup {
    parent: Row,
    pid: String,
    structmap: StructMapBuilder,
    total: RunTime,
}

#[derive(Debug)]
enum GroupState {
    Idle,
    Open(ObjectGroup),
}

/// Batch-wide values every record is rendered with.
#[derive(Debug)]
struct RenderContext<'a> {
    config: &'a BatchConfig,
    templates: &'a TemplateSet,
    parent_tags: TagTable,
    child_tags: TagTable,
    timestamp: String,
}

impl<'a> RenderContext<'a> {
    fn convert_duration(&self, row: &Row) -> Result<Option<RunTime>> {
        let raw = row.get(DURATION_FIELD)?;
        self.config
            .duration_mode
            .convert(raw)
            .map_err(|err| match err {
                FoxmlError::MalformedDuration { value, reason } => FoxmlError::MalformedField {
                    line: row.line(),
                    field: DURATION_FIELD.to_string(),
                    value,
                    reason,
                },
                other => other,
            })
    }

    fn render_child(&self, row: &Row, pid: &str, duration: Option<RunTime>) -> Result<RenderedRecord> {
        let flags = self.config.rights.flags();
        let technical = technical_metadata(row, self.config.media_type, duration)?;

        let mut map = PlaceholderMap::new();
        map.text("PID", pid)
            .text("ContentModel", self.config.content_model.as_str())
            .text("Status", flags.admin_status)
            .text("FileName", row.get("FileName")?)
            .text("DateDigitized", row.get("DateDigitized")?)
            .text("DigitizedByDept", row.get("DigitizedByDept")?)
            .text("ExtRefDescription", self.config.ext_ref_description.as_str())
            .text("SharestreamURL", row.get("SharestreamURLs")?)
            .text("DigitizedByPers", row.get("DigitizedByPers")?)
            .text("DigitizationNotes", row.get("DigitizationNotes")?)
            .text("AccessRights", flags.access_policy)
            .text("TimeStamp", self.timestamp.as_str())
            .markup("TechMeta", technical);

        let content = self.templates.umam.render(&map, &self.child_tags, pid)?;
        Ok(RenderedRecord {
            pid: pid.to_string(),
            kind: RowKind::Child,
            content: tidy(&content),
        })
    }

    /// Parent values that do not depend on the group's children.
    fn group_values(&self, pid: &str) -> PlaceholderMap {
        let mut map = PlaceholderMap::new();
        map.text("PID", pid)
            .text("ContentModel", self.config.content_model.as_str())
            .text("Status", self.config.rights.flags().descriptive_status)
            .text("CollectionPID", self.config.collection.as_str())
            .text("TimeStamp", self.timestamp.as_str());
        map
    }

    fn parent_map(&self, row: &Row, pid: &str, total: RunTime) -> Result<PlaceholderMap> {
        let mut map = self.group_values(pid);
        map.text("Title", row.get("Title")?)
            .text("AlternateTitle", row.get("AlternateTitle")?)
            .markup("Agents", descriptive::agents(row)?)
            .text("Identifier", row.get("Identifier")?)
            .text("Description/Summary", row.get("Description/Summary")?)
            .text("Rights", row.get("Rights")?)
            .text("CopyrightHolder", row.get("CopyrightHolder")?)
            .markup("MediaType/Form", descriptive::media_type(row)?)
            .text("Continent", row.get("Continent")?)
            .text("Country", row.get("Country")?)
            .text("Region/State", row.get("Region/State")?)
            .text("Settlement/City", row.get("Settlement/City")?)
            .markup("InsertDateHere", descriptive::dates(row)?)
            .text("Language", row.get("Language")?)
            .text("Dimensions", descriptive::dimensions(row)?)
            .text("DurationMasters", total.to_string())
            .text("Format", row.get("Format")?)
            .markup("RepositoryBrowse", descriptive::browse_terms(row)?)
            .text("Repository", row.get("Department")?)
            .markup("TopicalSubjects", descriptive::topical_subjects(row)?)
            .markup("ArchivalLocation", descriptive::archival_location(row)?);
        Ok(map)
    }

    fn render_parent(&self, group: ObjectGroup) -> Result<RenderedRecord> {
        let ObjectGroup {
            parent,
            pid,
            structmap,
            total,
        } = group;
        if let Some(name) = structmap.unresolved().first() {
            return Err(FoxmlError::UnresolvedPlaceholder {
                record: pid,
                token: token(name),
            });
        }
        let parts = structmap.parts();
        let mut map = self.parent_map(&parent, &pid, total)?;
        // inserted as finished markup so child values are not scanned again
        map.markup(METS_SLOT, structmap.finish());
        let content = self.templates.umdm.render(&map, &self.parent_tags, &pid)?;

        tracing::info!(pid = %pid, parts, total = %total, "Closed object group");
        Ok(RenderedRecord {
            pid,
            kind: RowKind::Parent,
            content: tidy(&content),
        })
    }

    fn summary(&self, row: &Row, kind: RowKind, pid: &str) -> Result<SummaryLine> {
        let access_url = match kind {
            RowKind::Parent => Some(format!("{}{pid}", self.config.access_url_prefix)),
            RowKind::Child => None,
        };
        Ok(SummaryLine {
            label: row.get("Identifier")?.to_string(),
            kind,
            pid: pid.to_string(),
            access_url,
        })
    }
}

/// Streaming state machine turning rows into rendered records.
///
/// Rows must be fed in input order. Call [`finish`](Self::finish) once the
/// input is exhausted to close the last group.
#[derive(Debug)]
pub struct BatchAssembler<'a> {
    context: RenderContext<'a>,
    ledger: &'a mut IdentifierLedger,
    state: GroupState,
    output: BatchOutput,
}

impl<'a> BatchAssembler<'a> {
    /// Create an assembler drawing identifiers from `ledger`.
    ///
    /// `timestamp` is written into every record of the batch.
    pub fn new(
        config: &'a BatchConfig,
        templates: &'a TemplateSet,
        ledger: &'a mut IdentifierLedger,
        timestamp: &str,
    ) -> Self {
        BatchAssembler {
            context: RenderContext {
                config,
                templates,
                parent_tags: TagTable::descriptive(config.duration_mode),
                child_tags: TagTable::empty(),
                timestamp: timestamp.to_string(),
            },
            ledger,
            state: GroupState::Idle,
            output: BatchOutput::new(),
        }
    }

    fn next_pid(&mut self) -> Result<String> {
        let pid = self.ledger.next_identifier()?;
        self.output.issue(&pid);
        Ok(pid)
    }

    /// Feed one row of multi-row data.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::OrphanChild`] for a child row before any parent,
    /// plus any row or rendering error of the records it completes.
    pub fn push(&mut self, row: Row) -> Result<()> {
        match row.kind()? {
            RowKind::Parent => {
                self.close_group()?;
                self.open_group(row)
            },
            RowKind::Child => self.add_child(&row),
        }
    }

    /// Feed one row of single-row data: a parent with exactly one child.
    ///
    /// Issues the parent identifier first, then the child's.
    ///
    /// # Errors
    ///
    /// Returns any row or rendering error of the two records.
    pub fn push_single(&mut self, row: Row) -> Result<()> {
        self.open_group(row)?;
        let GroupState::Open(group) = &self.state else {
            return Ok(());
        };
        let parent = group.parent.clone();
        self.add_child(&parent)?;
        self.close_group()
    }

    /// Close the last group and return the batch output.
    ///
    /// # Errors
    ///
    /// Returns any error rendering the final parent record.
    pub fn finish(mut self) -> Result<BatchOutput> {
        self.close_group()?;
        tracing::info!(
            records = self.output.records().len(),
            identifiers = self.output.issued().len(),
            parents = self.output.parent_pids().len(),
            "Batch assembled"
        );
        Ok(self.output)
    }

    fn open_group(&mut self, row: Row) -> Result<()> {
        let pid = self.next_pid()?;
        let summary = self.context.summary(&row, RowKind::Parent, &pid)?;
        self.output.push_summary(summary);
        tracing::debug!(pid = %pid, line = row.line(), "Opened object group");

        let structmap = StructMapBuilder::with_values(
            &self.context.templates.mets,
            self.context.config.order_base,
            &self.context.group_values(&pid),
            &self.context.parent_tags,
        );
        self.state = GroupState::Open(ObjectGroup {
            parent: row,
            pid,
            structmap,
            total: self.context.config.duration_mode.identity(),
        });
        Ok(())
    }

    fn add_child(&mut self, row: &Row) -> Result<()> {
        if !matches!(self.state, GroupState::Open(_)) {
            return Err(FoxmlError::OrphanChild { line: row.line() });
        }

        let pid = self.next_pid()?;
        let duration = self.context.convert_duration(row)?;
        let record = self.context.render_child(row, &pid, duration)?;
        let summary = self.context.summary(row, RowKind::Child, &pid)?;

        let shown = duration.map(|d| d.to_string()).unwrap_or_default();
        if let GroupState::Open(group) = &mut self.state {
            let id = group.structmap.add_child(&pid, row.get("FileName")?);
            if let Some(duration) = duration {
                group.total = group.total.checked_add(duration).ok_or_else(|| {
                    FoxmlError::MalformedField {
                        line: row.line(),
                        field: DURATION_FIELD.to_string(),
                        value: shown.clone(),
                        reason: "group run-time total is out of range".to_string(),
                    }
                })?;
            }
            tracing::debug!(
                pid = %pid,
                parent = %group.pid,
                id,
                duration = %shown,
                "Rendered child record"
            );
        }

        self.output.push_record(record);
        self.output.push_summary(summary);
        Ok(())
    }

    fn close_group(&mut self) -> Result<()> {
        if let GroupState::Open(group) = std::mem::replace(&mut self.state, GroupState::Idle) {
            let record = self.context.render_parent(group)?;
            self.output.push_record(record);
        }
        Ok(())
    }
}

/// Assemble a whole batch in memory.
///
/// Checks that the ledger covers the batch before anything is rendered, then
/// feeds every row in order according to the configured arrangement.
///
/// # Errors
///
/// Returns [`FoxmlError::InsufficientIdentifiers`] from the pre-flight check,
/// or the first row, rendering or configuration error.
pub fn assemble(
    rows: Vec<Row>,
    ledger: &mut IdentifierLedger,
    templates: &TemplateSet,
    config: &BatchConfig,
    timestamp: &str,
) -> Result<BatchOutput> {
    config.validate()?;
    let needed = config.arrangement.identifiers_needed(rows.len());
    ledger.reserve(needed)?;
    tracing::info!(
        rows = rows.len(),
        needed,
        arrangement = %config.arrangement,
        duration_mode = %config.duration_mode,
        "Assembling batch"
    );

    let mut assembler = BatchAssembler::new(config, templates, ledger, timestamp);
    for row in rows {
        match config.arrangement {
            Arrangement::Multi => assembler.push(row)?,
            Arrangement::Single => assembler.push_single(row)?,
        }
    }
    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationMode;
    use chrono::TimeZone;

    const SKELETON: &str = "<mets>\n  !!!Anchor-A!!!\n  !!!Anchor-B!!!\n  !!!Anchor-C!!!\n</mets>";

    fn templates() -> TemplateSet {
        TemplateSet::from_texts(
            "<umam pid=\"!!!PID!!!\">\n!!!TechMeta!!!\n</umam>",
            "<umdm pid=\"!!!PID!!!\">\n!!!DurationMasters!!!\n!!!INSERT_METS_HERE!!!\n</umdm>",
            SKELETON,
            [
                "<file ID=\"!!!ID!!!\" PID=\"!!!PID!!!\"/>",
                "<part ID=\"!!!ID!!!\"/>",
                "<div ORDER=\"!!!Order!!!\"/>",
            ],
        )
        .unwrap()
    }

    fn parent(line: usize) -> Row {
        let mut row = Row::new(line).with_field("XMLType", "UMDM");
        for field in [
            "Title",
            "AlternateTitle",
            "Creator",
            "CreatorType",
            "Contributor",
            "ContributorType",
            "Provider/Publisher",
            "Provider/PublisherType",
            "Description/Summary",
            "Rights",
            "CopyrightHolder",
            "MediaType",
            "FormType",
            "Form",
            "Continent",
            "Country",
            "Region/State",
            "Settlement/City",
            "DateCreated",
            "DateAttribute",
            "Century",
            "Language",
            "Dimensions",
            "Format",
            "RepositoryBrowse",
            "Department",
            "PersonalSubject",
            "PersonalScheme",
            "CorpSubject",
            "CorpScheme",
            "TopicalSubject",
            "TopicalScheme",
            "GeographicalSubject",
            "GeographicalScheme",
            "ArchivalCollection",
            "Series",
            "Subseries",
            "Box",
            "Item",
            "Accession",
        ] {
            row.insert(field, "");
        }
        row.with_field("Identifier", &format!("Item {line}"))
    }

    fn child(line: usize, duration: &str) -> Row {
        let mut row = Row::new(line).with_field("XMLType", "UMAM");
        for field in [
            "DateDigitized",
            "DigitizedByDept",
            "SharestreamURLs",
            "DigitizedByPers",
            "DigitizationNotes",
        ] {
            row.insert(field, "");
        }
        row.with_field("Identifier", &format!("Part {line}"))
            .with_field("FileName", &format!("file{line}.m4v"))
            .with_field(DURATION_FIELD, duration)
    }

    fn ledger(count: usize) -> IdentifierLedger {
        IdentifierLedger::new((1..=count).map(|i| format!("umd:{i}")).collect())
    }

    #[test]
    fn test_group_closes_after_children() {
        let templates = templates();
        let config = BatchConfig::default();
        let mut ledger = ledger(3);
        let rows = vec![parent(2), child(3, "00:10:00"), child(4, "00:20:30")];

        let output = assemble(rows, &mut ledger, &templates, &config, "t").unwrap();
        let kinds: Vec<RowKind> = output.records().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RowKind::Child, RowKind::Child, RowKind::Parent]);
        assert_eq!(output.issued(), ["umd:1", "umd:2", "umd:3"]);

        let parent = &output.records()[2].content;
        assert!(parent.contains("<extent units=\"minutes\">30.50</extent>"));
        assert!(parent.contains("<file ID=\"2\" PID=\"umd:2\"/>"));
        assert!(parent.contains("<file ID=\"3\" PID=\"umd:3\"/>"));
        assert!(parent.contains("<div ORDER=\"2\"/>"));
        assert!(!parent.contains("!!!"));
    }

    #[test]
    fn test_childless_group_totals_identity() {
        let templates = templates();
        let config = BatchConfig {
            duration_mode: DurationMode::Structured,
            ..Default::default()
        };
        let mut ledger = ledger(2);
        let output = assemble(vec![parent(2), parent(3)], &mut ledger, &templates, &config, "t").unwrap();

        assert_eq!(output.parent_pids(), ["umd:1", "umd:2"]);
        for record in output.records() {
            assert!(record.content.contains("<extent units=\"hh:mm:ss\">0:00:00</extent>"));
            assert!(!record.content.contains("Anchor"));
        }
    }

    #[test]
    fn test_orphan_child() {
        let templates = templates();
        let config = BatchConfig::default();
        let mut ledger = ledger(2);
        assert!(matches!(
            assemble(vec![child(2, ""), parent(3)], &mut ledger, &templates, &config, "t"),
            Err(FoxmlError::OrphanChild { line: 2 })
        ));
    }

    #[test]
    fn test_malformed_duration_reports_line() {
        let templates = templates();
        let config = BatchConfig::default();
        let mut ledger = ledger(2);
        match assemble(vec![parent(2), child(3, "1:30")], &mut ledger, &templates, &config, "t") {
            Err(FoxmlError::MalformedField { line, field, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(field, DURATION_FIELD);
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_preflight_shortage_renders_nothing() {
        let templates = templates();
        let config = BatchConfig::default();
        let mut ledger = ledger(1);
        assert!(matches!(
            assemble(vec![parent(2), child(3, "")], &mut ledger, &templates, &config, "t"),
            Err(FoxmlError::InsufficientIdentifiers {
                needed: 2,
                available: 1
            })
        ));
        assert_eq!(ledger.remaining(), 1);
    }

    #[test]
    fn test_single_row_issues_parent_first() {
        let templates = templates();
        let config = BatchConfig {
            arrangement: Arrangement::Single,
            ..Default::default()
        };
        let mut row = parent(2);
        for (name, value) in child(2, "00:01:30").fields() {
            if !row.has(name) {
                row.insert(name, value);
            }
        }

        let mut ledger = ledger(2);
        let output = assemble(vec![row], &mut ledger, &templates, &config, "t").unwrap();
        assert_eq!(output.issued(), ["umd:1", "umd:2"]);
        assert_eq!(output.records()[0].pid, "umd:2");
        assert_eq!(output.records()[1].pid, "umd:1");
        assert!(output.records()[1]
            .content
            .contains("<extent units=\"minutes\">1.50</extent>"));

        let kinds: Vec<RowKind> = output.summary().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![RowKind::Parent, RowKind::Child]);
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(timestamp(at), "2024-03-05T14:07:09.000000Z");
    }
}
