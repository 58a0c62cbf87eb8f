//! Navigation JSON for the site front end.

use wh_nodes::NavigationEntry;

/// Serialize the navigation tree as the front end's TOC document.
///
/// Source paths are written under `path`, entry types under `type` and
/// children under `pages`. Absent fields are omitted.
pub fn to_json(entries: &[NavigationEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}

/// Page identifier used by layouts: the URL without leading slash and `.html`.
///
/// ```
/// assert_eq!(wh_toc::page_id("/guide/intro.html"), "guide/intro");
/// ```
pub fn page_id(url: &str) -> &str {
    let id = url.strip_prefix('/').unwrap_or(url);
    id.strip_suffix(".html").unwrap_or(id)
}
