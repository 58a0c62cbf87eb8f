//! Per-pass render state and text helpers.

use std::collections::HashMap;
use std::fmt::Write;

/// Fallback anchor for headings whose title has no alphanumerics.
const FALLBACK_ID: &str = "section";

/// Heading recorded in a page's table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading title as plain text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// State accumulated while rendering one page.
#[derive(Debug, Default)]
pub(crate) struct RenderState {
    pub(crate) toc: Vec<TocEntry>,
    id_counts: HashMap<String, usize>,
}

impl RenderState {
    /// Claim an anchor id, suffixing `-1`, `-2`… when it is already taken.
    pub(crate) fn unique_id(&mut self, base: &str) -> String {
        let base = if base.is_empty() { FALLBACK_ID } else { base };
        let count = self.id_counts.entry(base.to_owned()).or_insert(0);
        let id = if *count == 0 {
            base.to_owned()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }

    /// Mark an explicit id as taken without renaming it.
    pub(crate) fn reserve_id(&mut self, id: &str) {
        *self.id_counts.entry(id.to_owned()).or_insert(0) += 1;
    }
}

/// Convert heading text to an anchor slug.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-` and trims dashes from both ends.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Encode every character as a decimal character entity.
///
/// ```
/// assert_eq!(wh_renderer::obfuscate("a@b"), "&#97;&#64;&#98;");
/// ```
#[must_use]
pub fn obfuscate(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 6);
    for c in s.chars() {
        let _ = write!(result, "&#{};", u32::from(c));
    }
    result
}
