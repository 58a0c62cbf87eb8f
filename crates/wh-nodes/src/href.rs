//! Link target classification and path rewriting helpers.

use std::sync::LazyLock;

use regex::Regex;

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap());

/// Markdown file extensions rewritten to `.html`.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Check whether `href` is an absolute URL (`scheme://...`) or protocol-relative (`//...`).
///
/// ```
/// use wh_nodes::href::is_absolute_url;
///
/// assert!(is_absolute_url("https://example.com"));
/// assert!(is_absolute_url("//cdn.example.com/x.js"));
/// assert!(!is_absolute_url("guide/intro.md"));
/// ```
pub fn is_absolute_url(href: &str) -> bool {
    href.starts_with("//") || ABSOLUTE_URL.is_match(href)
}

/// Check whether `href` leaves the site: http, https, ftp or protocol-relative.
pub fn is_external(href: &str) -> bool {
    ["http://", "https://", "ftp://", "//"]
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

/// Check whether `href` is rooted at the site (single leading slash).
pub fn is_site_relative(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

/// Split `href` into its path and the query/fragment suffix (kept verbatim).
pub fn split_suffix(href: &str) -> (&str, &str) {
    match href.find(['?', '#']) {
        Some(pos) => href.split_at(pos),
        None => (href, ""),
    }
}

/// Extension of the last path segment, without the dot.
///
/// A leading dot (`.htaccess`) does not start an extension.
pub fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < segment.len() => Some(&segment[pos + 1..]),
        _ => None,
    }
}

/// Path with the extension of its last segment removed.
pub fn strip_extension(path: &str) -> &str {
    match extension(path) {
        Some(ext) => &path[..path.len() - ext.len() - 1],
        None => path,
    }
}

/// Check whether the path points at a markdown source file.
pub fn is_markdown_path(path: &str) -> bool {
    extension(path).is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

/// Rewrite a markdown path to its `.html` counterpart, keeping query and fragment.
///
/// Paths that are not markdown are returned unchanged.
///
/// ```
/// use wh_nodes::href::markdown_to_html;
///
/// assert_eq!(markdown_to_html("intro.md#setup"), "intro.html#setup");
/// assert_eq!(markdown_to_html("logo.png"), "logo.png");
/// ```
pub fn markdown_to_html(href: &str) -> String {
    let (path, suffix) = split_suffix(href);
    if is_markdown_path(path) {
        format!("{}.html{suffix}", strip_extension(path))
    } else {
        href.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("http://example.com"));
        assert!(is_absolute_url("upsource:///src/Main.java"));
        assert!(is_absolute_url("//example.com"));
        assert!(!is_absolute_url("/guide/intro.md"));
        assert!(!is_absolute_url("mailto:someone@example.com"));
        assert!(!is_absolute_url("3d://nope"));
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.com"));
        assert!(is_external("ftp://files.example.com"));
        assert!(is_external("//example.com"));
        assert!(!is_external("mailto:someone@example.com"));
        assert!(!is_external("/guide"));
    }

    #[test]
    fn test_is_site_relative() {
        assert!(is_site_relative("/guide/intro.md"));
        assert!(!is_site_relative("//example.com"));
        assert!(!is_site_relative("guide/intro.md"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("guide/intro.md"), Some("md"));
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
        assert_eq!(extension("v1.2/readme"), None);
        assert_eq!(extension(".htaccess"), None);
        assert_eq!(extension("trailing."), None);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("/guide/intro.md"), "/guide/intro");
        assert_eq!(strip_extension("guide/intro"), "guide/intro");
        assert_eq!(strip_extension("page.txt"), "page");
    }

    #[test]
    fn test_markdown_to_html() {
        assert_eq!(markdown_to_html("/guide/intro.md"), "/guide/intro.html");
        assert_eq!(markdown_to_html("notes.markdown?x=1"), "notes.html?x=1");
        assert_eq!(markdown_to_html("#section"), "#section");
        assert_eq!(markdown_to_html("image.png"), "image.png");
    }
}
