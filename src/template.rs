//! Record templates and the set a batch renders with.
//!
//! A batch needs five template texts plus the structural-map skeleton:
//!
//! | File         | Purpose                                    |
//! |--------------|--------------------------------------------|
//! | `umam.xml`   | child (technical) record                   |
//! | `umdm.xml`   | parent (descriptive) record                |
//! | `mets.xml`   | structural-map skeleton with three anchors |
//! | `metsA.xml`  | per-child file entry                       |
//! | `metsB.xml`  | per-child part pointer                     |
//! | `metsC.xml`  | per-child ordered division                 |

use std::path::Path;

use crate::error::Result;
use crate::mets::MetsTemplates;
use crate::render::{placeholders, render, token, PlaceholderMap};
use crate::tags::TagTable;

/// Placeholder in the parent template that receives the structural map.
pub const METS_SLOT: &str = "INSERT_METS_HERE";

/// An immutable template text with `!!!Name!!!` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    /// Create a template; `name` is used in log messages.
    pub fn new(name: &str, text: impl Into<String>) -> Self {
        Template {
            name: name.to_string(),
            text: text.into(),
        }
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names used by this template.
    #[must_use]
    pub fn placeholders(&self) -> Vec<String> {
        placeholders(&self.text)
    }

    /// Render with the given substitutions.
    ///
    /// # Errors
    ///
    /// See [`render`].
    pub fn render(&self, map: &PlaceholderMap, tags: &TagTable, record: &str) -> Result<String> {
        render(&self.text, map, tags, record)
    }
}

/// Every template a batch renders with.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    /// Child record template
    pub umam: Template,
    /// Parent record template
    pub umdm: Template,
    /// Structural-map skeleton and snippets
    pub mets: MetsTemplates,
}

impl TemplateSet {
    /// Bundle templates from their texts.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::InvalidConfig`](crate::FoxmlError::InvalidConfig)
    /// when the skeleton is missing an anchor.
    pub fn from_texts(umam: &str, umdm: &str, skeleton: &str, snippets: [&str; 3]) -> Result<Self> {
        let set = TemplateSet {
            umam: Template::new("umam.xml", umam),
            umdm: Template::new("umdm.xml", umdm),
            mets: MetsTemplates::new(skeleton, snippets)?,
        };
        if !set.umdm.text().contains(&token(METS_SLOT)) {
            tracing::warn!(
                template = set.umdm.name(),
                "Parent template has no structural map slot"
            );
        }
        Ok(set)
    }

    /// Load the six template files from a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read or the skeleton is invalid.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| std::fs::read_to_string(dir.join(name));
        tracing::debug!(dir = %dir.display(), "Loading templates");
        let snippets = [read("metsA.xml")?, read("metsB.xml")?, read("metsC.xml")?];
        Self::from_texts(
            &read("umam.xml")?,
            &read("umdm.xml")?,
            &read("mets.xml")?,
            [
                snippets[0].as_str(),
                snippets[1].as_str(),
                snippets[2].as_str(),
            ],
        )
    }
}
