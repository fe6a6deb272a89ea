//! Placeholder substitution.
//!
//! Templates carry tokens of the form `!!!Name!!!`. Rendering makes one pass
//! over the template: each token is looked up in a [`PlaceholderMap`] and
//! replaced. Inserted text is never rescanned, so values that happen to contain
//! token-like text cannot trigger further substitution. Any token without an
//! entry is reported as [`FoxmlError::UnresolvedPlaceholder`].
//!
//! # Examples
//!
//! ```
//! use foxmlgen::render::{render, PlaceholderMap};
//! use foxmlgen::tags::TagTable;
//!
//! let mut map = PlaceholderMap::new();
//! map.text("Title", "Rock & Roll").text("AlternateTitle", "");
//!
//! let mut tags = TagTable::empty();
//! tags.insert("Title", "<title>", "</title>");
//! tags.insert("AlternateTitle", "<alt>", "</alt>");
//!
//! let xml = render("<r>!!!Title!!!!!!AlternateTitle!!!</r>", &map, &tags, "umd:1")?;
//! assert_eq!(xml, "<r><title>Rock &amp; Roll</title></r>");
//! # Ok::<(), foxmlgen::FoxmlError>(())
//! ```

use std::borrow::Cow;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::{FoxmlError, Result};
use crate::escape::escape_field;
use crate::tags::TagTable;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r#"!!!([^!<>"\r\n]+)!!!"#).expect("valid placeholder pattern");
}

/// Wrap a placeholder name in its delimiters.
#[must_use]
pub fn token(name: &str) -> String {
    format!("!!!{name}!!!")
}

/// What a placeholder is replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Raw field text; ampersands are escaped on insertion
    Text(String),
    /// Markup built by this crate; inserted verbatim
    Markup(String),
}

/// Placeholder name to substitution, for one record.
///
/// Names are given without the `!!!` delimiters.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    entries: IndexMap<String, Substitution>,
}

impl PlaceholderMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a placeholder to raw field text.
    pub fn text(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.entries
            .insert(name.to_string(), Substitution::Text(value.into()));
        self
    }

    /// Map a placeholder to ready-made markup.
    pub fn markup(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.entries
            .insert(name.to_string(), Substitution::Markup(value.into()));
        self
    }

    /// Look up a placeholder.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Substitution> {
        self.entries.get(name)
    }

    /// Number of mapped placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn resolve(&self, name: &str, tags: &TagTable) -> Option<String> {
        let content: Cow<'_, str> = match self.entries.get(name)? {
            Substitution::Text(value) => escape_field(value),
            Substitution::Markup(value) => Cow::Borrowed(value.as_str()),
        };
        Some(
            tags.compose(name, &content)
                .unwrap_or_else(|| content.into_owned()),
        )
    }
}

/// Replace every token `lookup` knows, leaving the others in place.
///
/// Returns the new text and the names of the tokens left behind, in order.
pub(crate) fn substitute<'t, F>(text: &'t str, mut lookup: F) -> (Cow<'t, str>, Vec<String>)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut unresolved = Vec::new();
    let output = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        if let Some(value) = lookup(name) {
            value
        } else {
            unresolved.push(name.to_string());
            caps[0].to_string()
        }
    });
    (output, unresolved)
}

/// Names of every token in `text`, in order of first appearance.
#[must_use]
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Render a template in a single substitution pass.
///
/// Registered placeholders in `tags` are wrapped in their element, or removed
/// when their value is blank. `record` names the record in error messages.
///
/// # Errors
///
/// Returns [`FoxmlError::UnresolvedPlaceholder`] for the first token that has
/// no entry in `map`.
pub fn render(template: &str, map: &PlaceholderMap, tags: &TagTable, record: &str) -> Result<String> {
    let (output, unresolved) = substitute(template, |name| map.resolve(name, tags));
    if let Some(name) = unresolved.into_iter().next() {
        return Err(FoxmlError::UnresolvedPlaceholder {
            record: record.to_string(),
            token: token(&name),
        });
    }
    Ok(output.into_owned())
}

/// Drop lines that are empty or whitespace-only.
///
/// Elided elements leave such lines behind; storage never sees them.
#[must_use]
pub fn tidy(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        output.push_str(line);
        output.push('\n');
    }
    output
}
