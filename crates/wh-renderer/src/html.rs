//! Built-in handlers for nodes with house rendering rules.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use wh_nodes::href::{is_external, is_site_relative, markdown_to_html};
use wh_nodes::{Attributes, NodeKind, ParseNode};

use crate::error::RenderError;
use crate::highlight::{HighlightMode, HighlightRequest};
use crate::renderer::{RenderPass, render_element, write_attr, write_attrs};
use crate::state::{TocEntry, escape_html, obfuscate, slugify};

/// Line-range metadata such as `{1-3,5}` trailing a code block class.
static HIGHLIGHT_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\d\s,-]+\}").unwrap());

static LANGUAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\blanguage-(\w+)").unwrap());

const DEFAULT_LANGUAGE: &str = "text";

/// Deepest heading level that gets an inline anchor link.
const ANCHOR_LINK_MAX_LEVEL: u8 = 3;

const SEE_ALSO_LABEL: &str = "seealso";
const SEE_ALSO_TITLE: &str = "See Also";

pub(crate) fn header(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    let level = node.level.unwrap_or(1).clamp(1, 6);
    let title = heading_title(node);

    let explicit = node.attr("id").filter(|id| !id.is_empty());
    let id = match explicit {
        Some(id) => {
            pass.state.reserve_id(id);
            id.to_owned()
        }
        None => pass.state.unique_id(&slugify(&title)),
    };
    pass.state.toc.push(TocEntry {
        level,
        title,
        id: id.clone(),
    });

    let mut attrs = node.attributes.clone();
    if explicit.is_none() && pass.context().auto_ids {
        attrs.insert("id", id.as_str());
    }

    let anchor = escape_html(&id);
    write!(out, "<a name=\"{anchor}\" class=\"elem-anchor\"></a><h{level}").unwrap();
    write_attrs(&attrs, out);
    out.push('>');
    pass.render_content(node, out)?;
    if level <= ANCHOR_LINK_MAX_LEVEL {
        write!(out, "<a href=\"#{anchor}\" class=\"anchor-link\"></a>").unwrap();
    }
    write!(out, "</h{level}>").unwrap();
    Ok(())
}

fn heading_title(node: &ParseNode) -> String {
    let raw = node.raw_text.trim();
    if raw.is_empty() {
        node.text_content().trim().to_owned()
    } else {
        raw.to_owned()
    }
}

pub(crate) fn code_block(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    let class = node.attr("class").unwrap_or_default();
    let (class, highlight_lines) = split_highlight_range(class);
    let language = code_language(class);
    let code = code_text(node);

    let html = pass.highlight(&HighlightRequest {
        code: &code,
        language,
        mode: HighlightMode::Block,
        highlight_lines,
    });
    write!(
        out,
        "<pre><code class=\"code-block__wrapper code-block _highlighted lang_{language}\">{html}</code></pre>"
    )
    .unwrap();
    Ok(())
}

pub(crate) fn code_span(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    let language = code_language(node.attr("class").unwrap_or_default());
    let code = code_text(node);

    let html = pass.highlight(&HighlightRequest {
        code: &code,
        language,
        mode: HighlightMode::Span,
        highlight_lines: None,
    });
    let mut attrs = node.attributes.clone();
    attrs.insert("class", format!("code highlight language-{language}"));

    out.push_str("<code");
    write_attrs(&attrs, out);
    write!(out, ">{html}</code>").unwrap();
    Ok(())
}

/// Split line-range metadata off a code class.
fn split_highlight_range(class: &str) -> (&str, Option<&str>) {
    match HIGHLIGHT_RANGE.find(class) {
        Some(range) => (&class[..range.start()], Some(range.as_str())),
        None => (class, None),
    }
}

/// Language from a `language-<word>` class, ignoring any `{…}` suffix.
fn code_language(class: &str) -> &str {
    let class = class.split_once('{').map_or(class, |(before, _)| before);
    LANGUAGE
        .captures(class)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_LANGUAGE, |m| m.as_str())
}

fn code_text(node: &ParseNode) -> Cow<'_, str> {
    if node.raw_text.is_empty() && !node.children.is_empty() {
        Cow::Owned(node.text_content())
    } else {
        Cow::Borrowed(node.raw_text.as_str())
    }
}

pub(crate) fn link(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    let context = pass.context();
    let href = node.attr("href").unwrap_or_default();
    let href = context
        .link_scheme
        .resolve(href)
        .map_err(|err| RenderError::configuration(err, node.position))?;

    let external = is_external(&href);
    let mut obfuscated_text = None;
    let href_html = if let Some(address) = href.strip_prefix("mailto:") {
        if node.text_content() == address {
            obfuscated_text = Some(obfuscate(address));
        }
        format!("{}:{}", obfuscate("mailto"), obfuscate(address))
    } else if external {
        escape_html(&href)
    } else if is_site_relative(&href) {
        escape_html(&markdown_to_html(&context.prefix_base(&href)))
    } else {
        escape_html(&markdown_to_html(&href))
    };

    write!(out, "<a href=\"{href_html}\"").unwrap();
    for (name, value) in node.attributes.iter() {
        let replaced = name == "href" || (external && matches!(name, "data-bypass" | "target"));
        if !replaced {
            write_attr(name, value, out);
        }
    }
    if external {
        out.push_str(" data-bypass=\"yes\" target=\"_blank\"");
    }
    out.push_str("><span>");
    match obfuscated_text {
        Some(text) => out.push_str(&text),
        None => pass.render_children(node, out)?,
    }
    out.push_str("</span></a>");
    Ok(())
}

pub(crate) fn image(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    let mut attrs = node.attributes.clone();
    if let Some(src) = node.attr("src").filter(|src| is_site_relative(src)) {
        attrs.insert("src", pass.context().prefix_base(src));
    }

    out.push_str("<img");
    write_attrs(&attrs, out);
    out.push_str(" />");
    Ok(())
}

/// Callouts keep the `<blockquote>` element with the label as a class.
/// See Also callouts become a `<div>` of columns.
pub(crate) fn blockquote(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    let Some(callout) = Callout::split(node) else {
        return render_element(pass, node, out);
    };

    let class = match node.attr("class").map(str::trim) {
        Some(existing) if !existing.is_empty() => format!("{} {existing}", callout.label),
        _ => callout.label.clone(),
    };
    let mut attrs = node.attributes.clone();
    attrs.insert("class", class);

    if callout.label == SEE_ALSO_LABEL {
        return see_also(pass, &callout, &attrs, out);
    }

    out.push_str("<blockquote");
    write_attrs(&attrs, out);
    out.push('>');
    for child in callout.body() {
        pass.render_node(child, out)?;
    }
    out.push_str("</blockquote>");
    Ok(())
}

/// Render a See Also callout as columns split at blank separators.
fn see_also(
    pass: &mut RenderPass<'_>,
    callout: &Callout<'_>,
    attrs: &Attributes,
    out: &mut String,
) -> Result<(), RenderError> {
    let mut groups: Vec<Vec<&ParseNode>> = vec![Vec::new()];
    for child in callout.body() {
        if child.kind == NodeKind::BlankSeparator {
            groups.push(Vec::new());
        } else if let Some(group) = groups.last_mut() {
            group.push(child);
        }
    }

    out.push_str("<div");
    write_attrs(attrs, out);
    write!(
        out,
        "><h4 class=\"seealso__title\">{SEE_ALSO_TITLE}</h4><div class=\"seealso__columns\">"
    )
    .unwrap();
    for group in groups.iter().filter(|group| !group.is_empty()) {
        out.push_str("<div class=\"seealso__column\">");
        for child in group {
            pass.render_node(child, out)?;
        }
        out.push_str("</div>");
    }
    out.push_str("</div></div>");
    Ok(())
}

/// Blockquote whose first paragraph starts with a bold label.
struct Callout<'n> {
    /// Label lowercased with whitespace removed.
    label: String,
    /// First paragraph without the label, if anything remains.
    lead: Option<ParseNode>,
    rest: &'n [ParseNode],
}

impl<'n> Callout<'n> {
    fn split(node: &'n ParseNode) -> Option<Self> {
        let (first, rest) = node.children.split_first()?;
        if first.kind != NodeKind::Paragraph {
            return None;
        }
        let (strong, remaining) = first.children.split_first()?;
        if strong.kind != NodeKind::Strong {
            return None;
        }

        let label: String = strong
            .text_content()
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        if label.is_empty() {
            return None;
        }

        let remaining = trim_leading_space(remaining);
        let lead = (!remaining.is_empty()).then(|| {
            let mut paragraph = ParseNode::new(NodeKind::Paragraph).with_children(remaining);
            paragraph.attributes = first.attributes.clone();
            paragraph.position = first.position;
            paragraph
        });

        Some(Self { label, lead, rest })
    }

    fn body(&self) -> impl Iterator<Item = &ParseNode> {
        self.lead.iter().chain(self.rest)
    }
}

/// Drop breaks and whitespace between a removed label and the text after it.
fn trim_leading_space(nodes: &[ParseNode]) -> Vec<ParseNode> {
    let mut nodes = nodes;
    while let Some((node, rest)) = nodes.split_first() {
        let blank = match node.kind {
            NodeKind::SoftBreak | NodeKind::LineBreak => true,
            NodeKind::Text => node.raw_text.trim().is_empty(),
            _ => false,
        };
        if !blank {
            break;
        }
        nodes = rest;
    }

    let mut trimmed = nodes.to_vec();
    if let Some(text) = trimmed.first_mut().filter(|n| n.kind == NodeKind::Text) {
        text.raw_text = text.raw_text.trim_start().to_owned();
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{HtmlRenderer, LinkSchemeConfig, RenderContext};

    fn render_with(markdown: &str, context: &RenderContext) -> String {
        let root = wh_markdown::parse(markdown);
        HtmlRenderer::new().render(&root, context).unwrap().html
    }

    fn render(markdown: &str) -> String {
        render_with(markdown, &RenderContext::new("/docs"))
    }

    /// Decode `&#NN;` entities back to text.
    fn decode_entities(s: &str) -> String {
        let mut out = String::new();
        let mut rest = s;
        while let Some(c) = rest.chars().next() {
            if let Some(entity) = rest.strip_prefix("&#") {
                let (code, tail) = entity.split_once(';').unwrap();
                out.push(char::from_u32(code.parse().unwrap()).unwrap());
                rest = tail;
            } else {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
        out
    }

    #[test]
    fn test_header_anchor_and_id() {
        assert_eq!(
            render("## Getting Started\n"),
            "<a name=\"getting-started\" class=\"elem-anchor\"></a><h2 id=\"getting-started\">Getting Started<a href=\"#getting-started\" class=\"anchor-link\"></a></h2>"
        );
    }

    #[test]
    fn test_deep_header_has_no_anchor_link() {
        assert_eq!(
            render("#### Details\n"),
            "<a name=\"details\" class=\"elem-anchor\"></a><h4 id=\"details\">Details</h4>"
        );
    }

    #[test]
    fn test_header_without_auto_ids_keeps_anchor() {
        let html = render_with(
            "### Install\n",
            &RenderContext::default().with_auto_ids(false),
        );

        assert_eq!(
            html,
            "<a name=\"install\" class=\"elem-anchor\"></a><h3>Install<a href=\"#install\" class=\"anchor-link\"></a></h3>"
        );
    }

    #[test]
    fn test_explicit_header_id_is_used() {
        let html = render("## Setup {#custom}\n");

        assert!(html.starts_with("<a name=\"custom\" class=\"elem-anchor\"></a><h2 id=\"custom\">"));
        assert!(html.contains("href=\"#custom\""));
    }

    #[test]
    fn test_duplicate_headers_and_page_toc() {
        let root = wh_markdown::parse("# Guide\n\n## Setup\n\n## Setup\n\n#### What's New?\n");
        let result = HtmlRenderer::new()
            .render(&root, &RenderContext::default())
            .unwrap();

        let toc: Vec<_> = result
            .toc
            .iter()
            .map(|e| (e.level, e.title.as_str(), e.id.as_str()))
            .collect();
        assert_eq!(
            toc,
            vec![
                (1, "Guide", "guide"),
                (2, "Setup", "setup"),
                (2, "Setup", "setup-1"),
                (4, "What's New?", "what-s-new"),
            ]
        );
    }

    #[test]
    fn test_code_block_with_language_and_range() {
        assert_eq!(
            render("```java{2}\nint a;\nint b;\n```\n"),
            "<pre><code class=\"code-block__wrapper code-block _highlighted lang_java\">int a;\n<span class=\"hll\">int b;</span>\n</code></pre>"
        );
    }

    #[test]
    fn test_code_block_range_past_last_line() {
        assert_eq!(
            render("```java{1-200000000}\nint a;\n```\n"),
            "<pre><code class=\"code-block__wrapper code-block _highlighted lang_java\"><span class=\"hll\">int a;</span>\n</code></pre>"
        );
    }

    #[test]
    fn test_code_block_defaults_to_text() {
        assert_eq!(
            render("```\n<tag>\n```\n"),
            "<pre><code class=\"code-block__wrapper code-block _highlighted lang_text\">&lt;tag&gt;\n</code></pre>"
        );
    }

    #[test]
    fn test_split_highlight_range() {
        assert_eq!(
            split_highlight_range("language-csharp{1-3,5}"),
            ("language-csharp", Some("{1-3,5}"))
        );
        assert_eq!(split_highlight_range("language-rust"), ("language-rust", None));
        assert_eq!(code_language("language-csharp{1-3,5}"), "csharp");
        assert_eq!(code_language("wide language-kotlin"), "kotlin");
        assert_eq!(code_language("plain"), "text");
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            render("Use `a<b` here\n"),
            "<p>Use <code class=\"code highlight language-text\">a&lt;b</code> here</p>"
        );
    }

    #[test]
    fn test_site_relative_markdown_link() {
        assert_eq!(
            render("[Intro](/guide/intro.md#setup)\n"),
            "<p><a href=\"/docs/guide/intro.html#setup\"><span>Intro</span></a></p>"
        );
    }

    #[test]
    fn test_relative_link_is_not_prefixed() {
        assert_eq!(
            render("[Next](next.markdown?x=1)\n"),
            "<p><a href=\"next.html?x=1\"><span>Next</span></a></p>"
        );
    }

    #[test]
    fn test_external_link_bypasses_router() {
        assert_eq!(
            render("[Site](https://example.com/readme.md)\n"),
            "<p><a href=\"https://example.com/readme.md\" data-bypass=\"yes\" target=\"_blank\"><span>Site</span></a></p>"
        );
    }

    #[test]
    fn test_missing_href_renders_empty() {
        let node = ParseNode::new(NodeKind::Link).with_child(ParseNode::text("x"));
        let result = HtmlRenderer::new()
            .render(&node, &RenderContext::default())
            .unwrap();

        assert_eq!(result.html, "<a href=\"\"><span>x</span></a>");
    }

    #[test]
    fn test_mailto_is_obfuscated() {
        let html = render("[team@example.com](mailto:team@example.com)\n");

        let href = html
            .split("href=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert!(!html.contains("team@example.com"));
        assert_eq!(decode_entities(href), "mailto:team@example.com");

        let text = html
            .split("<span>")
            .nth(1)
            .and_then(|rest| rest.split("</span>").next())
            .unwrap();
        assert_eq!(decode_entities(text), "team@example.com");
    }

    #[test]
    fn test_mailto_with_other_text_keeps_text() {
        let html = render("[Write us](mailto:team@example.com)\n");

        assert!(html.contains("<span>Write us</span>"));
        assert!(html.contains("&#109;&#97;&#105;&#108;&#116;&#111;:&#116;"));
    }

    #[test]
    fn test_scheme_links_resolve() {
        let context = |commit: &str| {
            RenderContext::default().with_link_scheme(LinkSchemeConfig::new(
                "upsource",
                "git.example.com",
                "proj",
                commit,
            ))
        };

        assert_eq!(
            render_with("[Main](upsource:///src/Main.java)\n", &context("HEAD")),
            "<p><a href=\"https://git.example.com/proj/file/HEAD/src/Main.java\" data-bypass=\"yes\" target=\"_blank\"><span>Main</span></a></p>"
        );
        assert!(
            render_with("[Main](upsource:///src/Main.java)\n", &context("abc123"))
                .contains("href=\"https://git.example.com/proj/file/proj-abc123/src/Main.java\"")
        );
    }

    #[test]
    fn test_malformed_scheme_link_fails_with_position() {
        let root = wh_markdown::parse("Intro\n\nSee [Main](upsource://src/Main.java)\n");
        let context = RenderContext::default().with_link_scheme(LinkSchemeConfig::new(
            "upsource",
            "git.example.com",
            "proj",
            "HEAD",
        ));

        let err = HtmlRenderer::new().render(&root, &context).unwrap_err();

        assert!(err.to_string().contains("upsource://src/Main.java"));
        assert_eq!(err.position().map(|p| p.line), Some(3));
    }

    #[test]
    fn test_image_src_prefixed_without_rewrite() {
        assert_eq!(
            render("![Logo](/img/logo.md)\n"),
            "<p><img src=\"/docs/img/logo.md\" alt=\"Logo\" /></p>"
        );
    }

    #[test]
    fn test_callout_label_becomes_class() {
        assert_eq!(
            render("> **Note** Keep it short.\n"),
            "<blockquote class=\"note\"><p>Keep it short.</p></blockquote>"
        );
    }

    #[test]
    fn test_callout_label_only_paragraph_is_dropped() {
        assert_eq!(
            render("> **Very Important**\n>\n> Body text.\n"),
            "<blockquote class=\"veryimportant\"><p>Body text.</p></blockquote>"
        );
    }

    #[test]
    fn test_callout_keeps_existing_class() {
        let node = ParseNode::new(NodeKind::Blockquote)
            .with_attr("class", "wide")
            .with_child(ParseNode::new(NodeKind::Paragraph).with_children([
                ParseNode::new(NodeKind::Strong).with_child(ParseNode::text("Tip")),
                ParseNode::text(" Use it."),
            ]));
        let result = HtmlRenderer::new()
            .render(&node, &RenderContext::default())
            .unwrap();

        assert_eq!(
            result.html,
            "<blockquote class=\"tip wide\"><p>Use it.</p></blockquote>"
        );
    }

    #[test]
    fn test_plain_blockquote_unchanged() {
        assert_eq!(
            render("> Just *quoted*.\n"),
            "<blockquote><p>Just <em>quoted</em>.</p></blockquote>"
        );
    }

    #[test]
    fn test_see_also_columns() {
        let html = render("> **See Also**\n> [A](/a.md)\n>\n> [B](b.md)\n>\n");

        assert_eq!(
            html,
            "<div class=\"seealso\"><h4 class=\"seealso__title\">See Also</h4><div class=\"seealso__columns\"><div class=\"seealso__column\"><p><a href=\"/docs/a.html\"><span>A</span></a></p></div><div class=\"seealso__column\"><p><a href=\"b.html\"><span>B</span></a></p></div></div></div>"
        );
    }

    #[test]
    fn test_see_also_list_group_is_own_column() {
        let html = render("> **See Also**\n>\n> - [A](a.md)\n> - [A2](a2.md)\n>\n> [B](b.md)\n");

        assert_eq!(html.matches("seealso__column\"").count(), 2);
        assert!(html.contains(
            "<div class=\"seealso__column\"><ul><li><a href=\"a.html\"><span>A</span></a></li><li><a href=\"a2.html\"><span>A2</span></a></li></ul></div><div class=\"seealso__column\"><p><a href=\"b.html\">"
        ));
    }

    #[test]
    fn test_see_also_skips_empty_groups() {
        let node = ParseNode::new(NodeKind::Blockquote).with_children([
            ParseNode::new(NodeKind::Paragraph).with_child(
                ParseNode::new(NodeKind::Strong).with_child(ParseNode::text("See also")),
            ),
            ParseNode::new(NodeKind::BlankSeparator),
            ParseNode::new(NodeKind::Paragraph).with_child(ParseNode::text("Only")),
            ParseNode::new(NodeKind::BlankSeparator),
        ]);
        let result = HtmlRenderer::new()
            .render(&node, &RenderContext::default())
            .unwrap();

        assert_eq!(result.html.matches("seealso__column\"").count(), 1);
        assert!(result.html.ends_with("<p>Only</p></div></div></div>"));
    }
}
