//! Composed markup blocks for parent (descriptive) records.
//!
//! Several descriptive placeholders stand for a run of elements derived from
//! one or more `;`-separated columns rather than for a single value:
//! - **Agents** - creators, contributors and providers with their name types
//! - **Dates** - century tags plus single, multiple or ranged dates
//! - **Browse terms** - repository browse subjects
//! - **Topical subjects** - personal, corporate, topical and geographical
//! - **Media type** - media type with its form
//! - **Archival location** - collection title plus series/box/item scopes
//!
//! Every function here escapes the field text it inserts and skips blank
//! entries, so no empty element is produced.

use std::fmt::Write;

use crate::error::{FoxmlError, Result};
use crate::escape::escape_field;
use crate::row::Row;

fn entries(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|s| !s.is_empty())
}

fn malformed(row: &Row, field: &str, value: &str, reason: &str) -> FoxmlError {
    FoxmlError::MalformedField {
        line: row.line(),
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Agent roles and the name/type column pairs they are read from.
const AGENT_COLUMNS: [(&str, &str, &str); 3] = [
    ("creator", "Creator", "CreatorType"),
    ("contributor", "Contributor", "ContributorType"),
    ("provider", "Provider/Publisher", "Provider/PublisherType"),
];

/// Build `<agent>` elements for creators, contributors and providers.
///
/// Each name column is paired entry-for-entry with its type column, whose
/// entries are `persName` or `corpName`. Entries of any other type are
/// skipped.
///
/// # Errors
///
/// Returns [`FoxmlError::MalformedField`] when a name column and its type
/// column have different entry counts.
pub fn agents(row: &Row) -> Result<String> {
    let mut xml = Vec::new();
    for (role, names_field, types_field) in AGENT_COLUMNS {
        let names_value = row.get(names_field)?;
        let types_value = row.get(types_field)?;
        if names_value.trim().is_empty() {
            continue;
        }

        let names: Vec<&str> = names_value.split(';').map(str::trim).collect();
        let types: Vec<&str> = types_value.split(';').map(str::trim).collect();
        if names.len() != types.len() {
            return Err(malformed(
                row,
                types_field,
                types_value,
                &format!(
                    "{} names but {} name types in {names_field:?}",
                    names.len(),
                    types.len()
                ),
            ));
        }

        for (name, name_type) in names.iter().zip(&types) {
            if name.is_empty() {
                continue;
            }
            if let "persName" | "corpName" = *name_type {
                xml.push(format!(
                    "<agent type=\"{role}\"><{name_type}>{}</{name_type}></agent>",
                    escape_field(name)
                ));
            } else {
                tracing::warn!(line = row.line(), name_type, "Skipping agent with unknown name type");
            }
        }
    }
    Ok(xml.join("\n"))
}

/// Build century and date elements.
///
/// `DateAttribute` keywords select the form of `DateCreated`:
/// `multiple` splits dates on `;`, `circa` marks them uncertain, and `range`
/// reads a `from-to` pair (either `YYYY-YYYY` or `YYYY-MM-DD-YYYY-MM-DD`).
/// Century tags come first, sorted.
///
/// # Errors
///
/// Returns [`FoxmlError::MalformedField`] for a range that is neither two nor
/// six `-`-separated parts.
pub fn dates(row: &Row) -> Result<String> {
    let date = row.get("DateCreated")?.trim();
    let attribute = row.get("DateAttribute")?;
    let century = row.get("Century")?;

    let mut centuries: Vec<&str> = entries(century).collect();
    centuries.sort_unstable();

    let mut xml = String::new();
    for c in centuries {
        writeln!(
            xml,
            "<century certainty=\"exact\" era=\"ad\">{}</century>",
            escape_field(c)
        )
        .ok();
    }

    let certainty = if attribute.contains("circa") {
        "circa"
    } else {
        "exact"
    };

    if date.is_empty() {
        // nothing to date
    } else if attribute.contains("range") {
        let parts: Vec<&str> = date.split('-').map(str::trim).collect();
        let (from, to) = match parts.len() {
            2 => (parts[0], parts[1]),
            6 => (parts[0], parts[3]),
            n => {
                return Err(malformed(
                    row,
                    "DateCreated",
                    date,
                    &format!("date range has {n} parts, expected 2 or 6"),
                ))
            },
        };
        writeln!(
            xml,
            "<date certainty=\"{certainty}\" era=\"ad\" from=\"{}\" to=\"{}\">{}</date>",
            escape_field(from),
            escape_field(to),
            escape_field(date)
        )
        .ok();
    } else if attribute.contains("multiple") {
        for d in entries(date) {
            writeln!(
                xml,
                "<date certainty=\"{certainty}\" era=\"ad\">{}</date>",
                escape_field(d)
            )
            .ok();
        }
    } else {
        writeln!(
            xml,
            "<date certainty=\"{certainty}\" era=\"ad\">{}</date>",
            escape_field(date)
        )
        .ok();
    }

    Ok(xml.trim_end().to_string())
}

/// Build `<subject type="browse">` elements from `RepositoryBrowse`.
///
/// # Errors
///
/// Returns [`FoxmlError::MissingField`] without the column.
pub fn browse_terms(row: &Row) -> Result<String> {
    Ok(entries(row.get("RepositoryBrowse")?)
        .map(|term| format!("<subject type=\"browse\">{}</subject>", escape_field(term)))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Build topical subject elements.
///
/// Reads the personal, corporate, topical and geographical subject columns,
/// each paired with a scheme column. Every entry becomes its own subject.
///
/// # Errors
///
/// Returns [`FoxmlError::MissingField`] when a subject or scheme column is absent.
pub fn topical_subjects(row: &Row) -> Result<String> {
    const SUBJECT_COLUMNS: [(&str, &str, Option<&str>, &str); 4] = [
        ("PersonalSubject", "PersonalScheme", Some("persName"), "topical"),
        ("CorpSubject", "CorpScheme", Some("corpName"), "topical"),
        ("TopicalSubject", "TopicalScheme", None, "topical"),
        (
            "GeographicalSubject",
            "GeographicalScheme",
            Some("geogName"),
            "geographical",
        ),
    ];

    let mut xml = Vec::new();
    for (subject_field, scheme_field, wrapper, subject_type) in SUBJECT_COLUMNS {
        let subjects = row.get(subject_field)?;
        let scheme = row.get(scheme_field)?.trim();
        for subject in entries(subjects) {
            let subject = escape_field(subject);
            let inner = match wrapper {
                Some(name) => format!("<{name}>{subject}</{name}>"),
                None => subject.into_owned(),
            };
            if scheme.is_empty() {
                xml.push(format!("<subject type=\"{subject_type}\">{inner}</subject>"));
            } else {
                xml.push(format!(
                    "<subject scheme=\"{}\" type=\"{subject_type}\">{inner}</subject>",
                    escape_field(scheme)
                ));
            }
        }
    }
    Ok(xml.join("\n"))
}

/// Build the media type element wrapping the form element.
///
/// # Errors
///
/// Returns [`FoxmlError::MissingField`] when `MediaType`, `FormType` or `Form`
/// is absent.
pub fn media_type(row: &Row) -> Result<String> {
    Ok(format!(
        "<mediaType type=\"{}\"><form type=\"{}\">{}</form></mediaType>",
        escape_field(row.get("MediaType")?.trim()),
        escape_field(row.get("FormType")?.trim()),
        escape_field(row.get("Form")?.trim())
    ))
}

/// Build the archival location: the collection title followed by a
/// `<bibScope>` for each non-empty series, subseries, box, item and accession.
///
/// Returns an empty string when every column is blank, so the surrounding
/// element is elided.
///
/// # Errors
///
/// Returns [`FoxmlError::MissingField`] when a location column is absent.
pub fn archival_location(row: &Row) -> Result<String> {
    const SCOPES: [(&str, &str); 5] = [
        ("series", "Series"),
        ("subseries", "Subseries"),
        ("box", "Box"),
        ("item", "Item"),
        ("accession", "Accession"),
    ];

    let mut xml = Vec::new();
    let collection = row.get("ArchivalCollection")?.trim();
    if !collection.is_empty() {
        xml.push(format!(
            "<title type=\"main\">{}</title>",
            escape_field(collection)
        ));
    }
    for (scope, field) in SCOPES {
        let value = row.get(field)?.trim();
        if !value.is_empty() {
            xml.push(format!(
                "<bibScope type=\"{scope}\">{}</bibScope>",
                escape_field(value)
            ));
        }
    }
    Ok(xml.join("\n"))
}

/// Physical dimensions with one trailing inch mark (`"`) removed.
///
/// # Errors
///
/// Returns [`FoxmlError::MissingField`] without the column.
pub fn dimensions(row: &Row) -> Result<&str> {
    let value = row.get("Dimensions")?;
    Ok(value.strip_suffix('"').unwrap_or(value))
}
