//! Escaping of raw field text before it is inserted into XML output.
//!
//! Catalog data is already expected to be markup-safe apart from literal
//! ampersands, so exactly one character class is escaped. Template text is
//! never passed through here; only inserted values are.

use std::borrow::Cow;

/// Escape literal ampersands as `&amp;`.
///
/// Borrows the input when there is nothing to escape.
///
/// # Examples
///
/// ```
/// use foxmlgen::escape::escape_field;
///
/// assert_eq!(escape_field("Rock & Roll"), "Rock &amp; Roll");
/// assert_eq!(escape_field("<b>"), "<b>");
/// ```
#[must_use]
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains('&') {
        Cow::Owned(value.replace('&', "&amp;"))
    } else {
        Cow::Borrowed(value)
    }
}
