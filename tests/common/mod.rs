//! Common test helpers shared across the integration suite.

#![allow(dead_code)]

use foxmlgen::{IdentifierLedger, Row, TemplateSet};

/// Fixed timestamp so rendered output is reproducible.
pub const TIMESTAMP: &str = "2024-03-05T14:07:09.000000Z";

/// Loads the shipped templates.
pub fn shipped_templates() -> TemplateSet {
    TemplateSet::from_texts(
        include_str!("../../templates/umam.xml"),
        include_str!("../../templates/umdm.xml"),
        include_str!("../../templates/mets.xml"),
        [
            include_str!("../../templates/metsA.xml"),
            include_str!("../../templates/metsB.xml"),
            include_str!("../../templates/metsC.xml"),
        ],
    )
    .expect("shipped templates are valid")
}

/// A ledger of `count` identifiers, `umd:5001` upwards.
pub fn ledger(count: usize) -> IdentifierLedger {
    IdentifierLedger::new((0..count).map(|i| format!("umd:{}", 5001 + i)).collect())
}

/// The same identifiers as an allocation service answer.
pub fn allocation_document(count: usize) -> String {
    let mut doc = String::from("<?xml version=\"1.0\"?>\n<pidList>\n");
    for i in 0..count {
        doc.push_str(&format!("  <pid>umd:{}</pid>\n", 5001 + i));
    }
    doc.push_str("</pidList>\n");
    doc
}

/// Descriptive columns of a parent row, with realistic values.
pub const PARENT_FIELDS: [(&str, &str); 40] = [
    ("Title", "Homecoming Parade"),
    ("AlternateTitle", ""),
    ("Creator", "Smith, Jane; WMUC Radio"),
    ("CreatorType", "persName; corpName"),
    ("Contributor", ""),
    ("ContributorType", ""),
    ("Provider/Publisher", ""),
    ("Provider/PublisherType", ""),
    ("Description/Summary", "Footage of the 1968 parade & rally."),
    ("Rights", "Copyright status undetermined"),
    ("CopyrightHolder", ""),
    ("MediaType", "moving image"),
    ("FormType", "film"),
    ("Form", "reel"),
    ("Continent", "North America"),
    ("Country", "United States"),
    ("Region/State", "Maryland"),
    ("Settlement/City", "College Park"),
    ("DateCreated", "1968"),
    ("DateAttribute", ""),
    ("Century", "1901-2000"),
    ("Language", "eng"),
    ("Dimensions", "16\""),
    ("Format", "16mm film"),
    ("RepositoryBrowse", "Athletics; Student life"),
    ("Department", "University Archives"),
    ("PersonalSubject", ""),
    ("PersonalScheme", ""),
    ("CorpSubject", ""),
    ("CorpScheme", ""),
    ("TopicalSubject", "Parades; Homecoming"),
    ("TopicalScheme", "lcsh"),
    ("GeographicalSubject", ""),
    ("GeographicalScheme", ""),
    ("ArchivalCollection", "University Archives Film Collection"),
    ("Series", ""),
    ("Subseries", ""),
    ("Box", "3"),
    ("Item", ""),
    ("Accession", ""),
];

/// Technical columns of a child row, duration and file name excluded.
pub const CHILD_FIELDS: [(&str, &str); 9] = [
    ("DateDigitized", "2013-06-12"),
    ("DigitizedByDept", "Digital Conversion and Media Reformatting"),
    ("SharestreamURLs", "http://stream.example.edu/play?id=1&fmt=m4v"),
    ("DigitizedByPers", "Doe, John"),
    ("DigitizationNotes", ""),
    ("Color", "color"),
    ("DataRate", "1500 kbps"),
    ("FrameRate", "29.97"),
    ("Mono/Stereo", "mono"),
];

/// A parent row of multi-row data.
pub fn parent_row(line: usize, identifier: &str) -> Row {
    let mut row = Row::new(line)
        .with_field("XMLType", "UMDM")
        .with_field("Identifier", identifier);
    for (name, value) in PARENT_FIELDS {
        row.insert(name, value);
    }
    row
}

/// A child row of multi-row data.
pub fn child_row(line: usize, identifier: &str, file_name: &str, duration: &str) -> Row {
    let mut row = Row::new(line)
        .with_field("XMLType", "UMAM")
        .with_field("Identifier", identifier)
        .with_field("FileName", file_name)
        .with_field("DurationDerivatives", duration);
    for (name, value) in CHILD_FIELDS {
        row.insert(name, value);
    }
    row
}

/// A single-row object: parent and child columns on one row.
pub fn single_row(line: usize, identifier: &str, file_name: &str, duration: &str) -> Row {
    let mut row = parent_row(line, identifier);
    row.insert("FileName", file_name);
    row.insert("DurationDerivatives", duration);
    for (name, value) in CHILD_FIELDS {
        row.insert(name, value);
    }
    row
}

/// Whether `text` still holds a `!!!Name!!!` token.
pub fn has_token(text: &str) -> bool {
    foxmlgen::render::placeholders(text).into_iter().next().is_some()
}
