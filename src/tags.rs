//! Element wrapping for placeholder values.
//!
//! Some placeholders in a descriptive template stand for a whole element rather
//! than for element content. A [`TagTable`] maps those placeholder names to the
//! element that should surround the value. An empty value removes the
//! placeholder entirely instead of leaving an empty element behind.

use indexmap::IndexMap;

use crate::duration::DurationMode;

/// Opening and closing markup for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTag {
    /// Markup written before the value
    pub open: String,
    /// Markup written after the value
    pub close: String,
}

/// Placeholder name to element lookup.
///
/// Names are given without the `!!!` delimiters.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    tags: IndexMap<String, ElementTag>,
}

impl TagTable {
    /// A table with no entries. Every value is inserted as-is.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The element table used for parent (descriptive) records.
    ///
    /// The extent element carries the batch's duration units.
    #[must_use]
    pub fn descriptive(mode: DurationMode) -> Self {
        let mut table = Self::empty();
        table.insert("ContentModel", "<type>", "</type>");
        table.insert("Status", "<status>", "</status>");
        table.insert("Title", "<title type=\"main\">", "</title>");
        table.insert("AlternateTitle", "<title type=\"alternate\">", "</title>");
        table.insert("Identifier", "<identifier>", "</identifier>");
        table.insert(
            "Description/Summary",
            "<description type=\"summary\">",
            "</description>",
        );
        table.insert("Rights", "<rights>", "</rights>");
        table.insert(
            "CopyrightHolder",
            "<rights type=\"copyrightowner\">",
            "</rights>",
        );
        table.insert("Continent", "<geogName type=\"continent\">", "</geogName>");
        table.insert("Country", "<geogName type=\"country\">", "</geogName>");
        table.insert("Region/State", "<geogName type=\"region\">", "</geogName>");
        table.insert(
            "Settlement/City",
            "<geogName type=\"settlement\">",
            "</geogName>",
        );
        table.insert(
            "Repository",
            "<repository><corpName>",
            "</corpName></repository>",
        );
        table.insert("Dimensions", "<size units=\"in\">", "</size>");
        table.insert(
            "DurationMasters",
            &format!("<extent units=\"{}\">", mode.units()),
            "</extent>",
        );
        table.insert("Format", "<format>", "</format>");
        table.insert("ArchivalLocation", "<bibRef>", "</bibRef>");
        table.insert("Language", "<language>", "</language>");
        table
    }

    /// Register (or replace) the element for a placeholder.
    pub fn insert(&mut self, name: &str, open: &str, close: &str) {
        self.tags.insert(
            name.to_string(),
            ElementTag {
                open: open.to_string(),
                close: close.to_string(),
            },
        );
    }

    /// Whether the placeholder is wrapped in an element.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// The element registered for a placeholder.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ElementTag> {
        self.tags.get(name)
    }

    /// Wrap already-escaped content in the placeholder's element.
    ///
    /// Returns `None` for unregistered placeholders. Blank content yields an
    /// empty string so the placeholder disappears along with its element.
    #[must_use]
    pub fn compose(&self, name: &str, content: &str) -> Option<String> {
        let tag = self.tags.get(name)?;
        if content.trim().is_empty() {
            Some(String::new())
        } else {
            Some(format!("{}{}{}", tag.open, content, tag.close))
        }
    }

    /// Number of registered placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no placeholder is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_wraps_value() {
        let table = TagTable::descriptive(DurationMode::Minutes);
        assert_eq!(
            table.compose("Title", "Homecoming"),
            Some("<title type=\"main\">Homecoming</title>".to_string())
        );
        assert_eq!(
            table.compose("Repository", "Special Collections"),
            Some("<repository><corpName>Special Collections</corpName></repository>".to_string())
        );
    }

    #[test]
    fn test_compose_elides_empty_value() {
        let table = TagTable::descriptive(DurationMode::Minutes);
        assert_eq!(table.compose("AlternateTitle", ""), Some(String::new()));
        assert_eq!(table.compose("Country", "   "), Some(String::new()));
    }

    #[test]
    fn test_unregistered_placeholder() {
        let table = TagTable::descriptive(DurationMode::Minutes);
        assert_eq!(table.compose("PID", "umd:1"), None);
        assert!(!table.contains("TimeStamp"));
    }

    #[test]
    fn test_extent_units_follow_mode() {
        let minutes = TagTable::descriptive(DurationMode::Minutes);
        let clock = TagTable::descriptive(DurationMode::Structured);
        assert_eq!(
            minutes.compose("DurationMasters", "12.50").as_deref(),
            Some("<extent units=\"minutes\">12.50</extent>")
        );
        assert_eq!(
            clock.compose("DurationMasters", "0:12:30").as_deref(),
            Some("<extent units=\"hh:mm:ss\">0:12:30</extent>")
        );
    }

    #[test]
    fn test_rights_is_plain_element() {
        let table = TagTable::descriptive(DurationMode::Minutes);
        assert_eq!(table.get("Rights").unwrap().open, "<rights>");
    }

    #[test]
    fn test_empty_table() {
        let table = TagTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.compose("Title", "x"), None);
        assert_eq!(TagTable::descriptive(DurationMode::Minutes).len(), 18);
    }
}
