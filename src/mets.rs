//! Incremental construction of a parent's structural map.
//!
//! A structural map starts from a skeleton holding three anchor tokens,
//! `!!!Anchor-A!!!`, `!!!Anchor-B!!!` and `!!!Anchor-C!!!`. Each child added to
//! the group fills one snippet per anchor with the child's identifier, file
//! name and position, and splices it in just before the anchor. The anchor
//! stays in place for the next child. [`StructMapBuilder::finish`] removes the
//! anchors once the group closes.
//!
//! Snippet tokens:
//! - `!!!PID!!!` - the child's identifier
//! - `!!!FileName!!!` - the child's file name
//! - `!!!ID!!!` - structural-map ID, `order_base + n`
//! - `!!!Order!!!` - the child's 1-based position `n` within the group
//!
//! Any other token in the skeleton or the snippets is a group-level value. It
//! is resolved from the [`PlaceholderMap`] given to
//! [`StructMapBuilder::with_values`] before any child is spliced in, so child
//! values are never scanned for tokens. Tokens the map lacks are kept in the
//! text and listed by [`StructMapBuilder::unresolved`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{FoxmlError, Result};
use crate::escape::escape_field;
use crate::render::{substitute, token, PlaceholderMap};
use crate::tags::TagTable;

/// Anchor tokens, in snippet order.
pub const ANCHORS: [&str; 3] = ["!!!Anchor-A!!!", "!!!Anchor-B!!!", "!!!Anchor-C!!!"];

/// Snippet tokens filled per child.
const CHILD_TOKENS: [&str; 4] = ["PID", "FileName", "ID", "Order"];

lazy_static! {
    static ref ANCHOR_LINE: Regex =
        Regex::new(r"\r?\n[ \t]*!!!Anchor-[ABC]!!![ \t]*").expect("valid anchor pattern");
}

/// The skeleton and the three snippets of a structural map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetsTemplates {
    skeleton: String,
    snippets: [String; 3],
}

impl MetsTemplates {
    /// Bundle a skeleton with the snippets spliced at anchors A, B and C.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::InvalidConfig`] if the skeleton lacks an anchor,
    /// since children would then silently drop out of the map.
    pub fn new(skeleton: &str, snippets: [&str; 3]) -> Result<Self> {
        for anchor in ANCHORS {
            if !skeleton.contains(anchor) {
                return Err(FoxmlError::InvalidConfig(format!(
                    "structural map skeleton has no {anchor} anchor"
                )));
            }
        }
        Ok(MetsTemplates {
            skeleton: skeleton.to_string(),
            snippets: snippets.map(|s| s.trim().to_string()),
        })
    }

    /// The skeleton text.
    #[must_use]
    pub fn skeleton(&self) -> &str {
        &self.skeleton
    }
}

/// Running structural map for one open group.
#[derive(Debug, Clone)]
pub struct StructMapBuilder {
    snippets: [String; 3],
    state: String,
    parts: u32,
    order_base: u32,
    unresolved: Vec<String>,
}

impl StructMapBuilder {
    /// Start a new map from the skeleton, with no group-level values.
    #[must_use]
    pub fn new(templates: &MetsTemplates, order_base: u32) -> Self {
        Self::with_values(templates, order_base, &PlaceholderMap::new(), &TagTable::empty())
    }

    /// Start a new map, resolving group-level tokens from `values`.
    ///
    /// Anchors and the per-child snippet tokens are left for later.
    #[must_use]
    pub fn with_values(
        templates: &MetsTemplates,
        order_base: u32,
        values: &PlaceholderMap,
        tags: &TagTable,
    ) -> Self {
        let mut unresolved = Vec::new();
        let mut prefill = |text: &str, keep: &dyn Fn(&str) -> bool| {
            let (filled, left) = substitute(text, |name| {
                if keep(name) {
                    None
                } else {
                    values.resolve(name, tags)
                }
            });
            for name in left {
                if !keep(&name) && !unresolved.contains(&name) {
                    unresolved.push(name);
                }
            }
            filled.into_owned()
        };

        let is_anchor = |name: &str| ANCHORS.contains(&token(name).as_str());
        let is_child = |name: &str| CHILD_TOKENS.contains(&name);
        let state = prefill(&templates.skeleton, &is_anchor);
        let snippets = [
            prefill(&templates.snippets[0], &is_child),
            prefill(&templates.snippets[1], &is_child),
            prefill(&templates.snippets[2], &is_child),
        ];

        StructMapBuilder {
            snippets,
            state,
            parts: 0,
            order_base,
            unresolved,
        }
    }

    /// Splice in the next child and return its structural-map ID.
    pub fn add_child(&mut self, pid: &str, file_name: &str) -> u32 {
        self.parts += 1;
        let order = self.parts;
        let id = self.order_base + order;

        for (anchor, snippet) in ANCHORS.iter().zip(&self.snippets) {
            let (filled, _) = substitute(snippet, |name| match name {
                "PID" => Some(escape_field(pid).into_owned()),
                "FileName" => Some(escape_field(file_name).into_owned()),
                "ID" => Some(id.to_string()),
                "Order" => Some(order.to_string()),
                _ => None,
            });
            splice_before_anchor(&mut self.state, anchor, &filled);
        }
        id
    }

    /// Group-level tokens with no value, in order of first appearance.
    #[must_use]
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Children added so far.
    #[must_use]
    pub fn parts(&self) -> u32 {
        self.parts
    }

    /// Remove the anchors and return the finished map.
    #[must_use]
    pub fn finish(self) -> String {
        let mut map = ANCHOR_LINE.replace_all(&self.state, "").into_owned();
        for anchor in ANCHORS {
            if map.contains(anchor) {
                map = map.replace(anchor, "");
            }
        }
        map
    }
}

/// Insert `block` before `anchor`, on its own line at the anchor's indentation.
fn splice_before_anchor(state: &mut String, anchor: &str, block: &str) {
    let Some(position) = state.find(anchor) else {
        return;
    };
    let line_start = state[..position].rfind('\n').map_or(0, |i| i + 1);
    let leading = &state[line_start..position];
    let indent = if leading.chars().all(|c| c == ' ' || c == '\t') {
        leading.to_string()
    } else {
        String::new()
    };

    let mut replacement = String::new();
    for (i, line) in block.lines().enumerate() {
        if i > 0 {
            replacement.push('\n');
            replacement.push_str(&indent);
        }
        replacement.push_str(line);
    }
    replacement.push('\n');
    replacement.push_str(&indent);
    replacement.push_str(anchor);

    state.replace_range(position..position + anchor.len(), &replacement);
}
