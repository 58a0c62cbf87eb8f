//! Code highlighting seam.
//!
//! The renderer never highlights code itself. Code blocks and spans are
//! handed to a [`CodeHighlighter`] together with their language and, for
//! blocks, the raw `{1-3,5}` line-range metadata from the class attribute.
//! The returned string is inserted into the output verbatim, so
//! implementations must escape the code they emit.

use std::collections::BTreeSet;

use crate::state::escape_html;

/// Where the code appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightMode {
    Block,
    Span,
}

/// Code handed to a highlighter.
#[derive(Clone, Copy, Debug)]
pub struct HighlightRequest<'a> {
    pub code: &'a str,
    /// Language tag, `text` when none was given.
    pub language: &'a str,
    pub mode: HighlightMode,
    /// Line-range metadata such as `{1-3,5}`, blocks only.
    pub highlight_lines: Option<&'a str>,
}

/// Turns code into HTML.
pub trait CodeHighlighter: Send + Sync {
    /// Produce HTML for the code in `request`.
    fn highlight(&self, request: &HighlightRequest<'_>) -> String;
}

/// Escaping-only highlighter.
///
/// Lines named by the range metadata are wrapped in
/// `<span class="hll">…</span>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, request: &HighlightRequest<'_>) -> String {
        let lines = match (request.mode, request.highlight_lines) {
            (HighlightMode::Block, Some(ranges)) => {
                parse_line_ranges(ranges, request.code.split_inclusive('\n').count())
            }
            _ => BTreeSet::new(),
        };
        if lines.is_empty() {
            return escape_html(request.code);
        }

        let mut out = String::with_capacity(request.code.len() + lines.len() * 24);
        for (number, line) in (1..).zip(request.code.split_inclusive('\n')) {
            if lines.contains(&number) {
                let (content, newline) = match line.strip_suffix('\n') {
                    Some(content) => (content, "\n"),
                    None => (line, ""),
                };
                out.push_str("<span class=\"hll\">");
                out.push_str(&escape_html(content));
                out.push_str("</span>");
                out.push_str(newline);
            } else {
                out.push_str(&escape_html(line));
            }
        }
        out
    }
}

/// Expand line-range metadata into 1-based line numbers.
///
/// Braces are optional. Malformed parts are skipped and ranges are clamped
/// to `line_count`.
///
/// ```
/// let lines = wh_renderer::parse_line_ranges("{1-3,5}", 10);
/// assert_eq!(lines.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
/// ```
pub fn parse_line_ranges(ranges: &str, line_count: usize) -> BTreeSet<usize> {
    let inner = ranges.trim().trim_start_matches('{').trim_end_matches('}');
    let mut lines = BTreeSet::new();

    for part in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                if let (Ok(start), Ok(end)) =
                    (start.trim().parse::<usize>(), end.trim().parse::<usize>())
                {
                    lines.extend(start.max(1)..=end.min(line_count));
                }
            }
            None => {
                if let Ok(line) = part.parse::<usize>()
                    && (1..=line_count).contains(&line)
                {
                    lines.insert(line);
                }
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn block<'a>(code: &'a str, lines: Option<&'a str>) -> HighlightRequest<'a> {
        HighlightRequest {
            code,
            language: "java",
            mode: HighlightMode::Block,
            highlight_lines: lines,
        }
    }

    #[test]
    fn test_parse_line_ranges() {
        let collect = |s| parse_line_ranges(s, 10).into_iter().collect::<Vec<_>>();

        assert_eq!(collect("{1-3,5}"), vec![1, 2, 3, 5]);
        assert_eq!(collect("2, 2,4-4"), vec![2, 4]);
        assert_eq!(collect("{x,3-a,7}"), vec![7]);
        assert_eq!(collect("{0,0-1}"), vec![1]);
        assert_eq!(collect("{}"), Vec::<usize>::new());
        assert_eq!(collect("{5-3}"), Vec::<usize>::new());
    }

    #[test]
    fn test_parse_line_ranges_clamps_to_line_count() {
        let lines = parse_line_ranges("{2-200000000,7,999999999}", 3);

        assert_eq!(lines.into_iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_plain_highlighter_huge_range() {
        let html = PlainHighlighter.highlight(&block("int x;\n", Some("{1-200000000}")));

        assert_eq!(html, "<span class=\"hll\">int x;</span>\n");
    }

    #[test]
    fn test_plain_highlighter_escapes() {
        let html = PlainHighlighter.highlight(&block("a < b && c", None));

        assert_eq!(html, "a &lt; b &amp;&amp; c");
    }

    #[test]
    fn test_plain_highlighter_wraps_requested_lines() {
        let html = PlainHighlighter.highlight(&block("one\ntwo\nthree\n", Some("{1,3}")));

        assert_eq!(
            html,
            "<span class=\"hll\">one</span>\ntwo\n<span class=\"hll\">three</span>\n"
        );
    }

    #[test]
    fn test_span_mode_ignores_ranges() {
        let request = HighlightRequest {
            mode: HighlightMode::Span,
            ..block("x", Some("{1}"))
        };

        assert_eq!(PlainHighlighter.highlight(&request), "x");
    }
}
