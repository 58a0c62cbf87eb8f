//! Table-dispatched HTML renderer.
//!
//! Rendering walks the parse tree once. Each node is handed to the
//! [`NodeHandler`] registered for its kind, or to [`render_element`] when
//! there is none. Handlers write into a shared output buffer and recurse
//! through the [`RenderPass`], which also carries the page's heading table
//! of contents and anchor id counts.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use wh_nodes::{Attributes, NodeKind, ParseNode};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::highlight::{CodeHighlighter, HighlightRequest, PlainHighlighter};
use crate::html;
use crate::state::{RenderState, TocEntry, escape_html};

/// Renders one node into `out`.
pub type NodeHandler =
    fn(pass: &mut RenderPass<'_>, node: &ParseNode, out: &mut String) -> Result<(), RenderError>;

/// Output of a render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Headings of the page in document order.
    pub toc: Vec<TocEntry>,
}

/// HTML renderer with a per-kind handler table.
///
/// The renderer holds no per-page state and can render pages from several
/// threads at once.
pub struct HtmlRenderer {
    handlers: HashMap<NodeKind, NodeHandler>,
    highlighter: Box<dyn CodeHighlighter>,
}

impl HtmlRenderer {
    /// Create a renderer with the built-in handlers and [`PlainHighlighter`].
    #[must_use]
    pub fn new() -> Self {
        let handlers: [(NodeKind, NodeHandler); 6] = [
            (NodeKind::Header, html::header),
            (NodeKind::CodeBlock, html::code_block),
            (NodeKind::CodeSpan, html::code_span),
            (NodeKind::Link, html::link),
            (NodeKind::Image, html::image),
            (NodeKind::Blockquote, html::blockquote),
        ];
        Self {
            handlers: handlers.into_iter().collect(),
            highlighter: Box::new(PlainHighlighter),
        }
    }

    /// Register or replace the handler for a node kind.
    #[must_use]
    pub fn with_handler(mut self, kind: NodeKind, handler: NodeHandler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Replace the code highlighter.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl CodeHighlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    /// Render a tree to HTML.
    ///
    /// Fails on the first link the context cannot resolve.
    pub fn render(
        &self,
        node: &ParseNode,
        context: &RenderContext,
    ) -> Result<RenderResult, RenderError> {
        let mut pass = RenderPass {
            renderer: self,
            context,
            state: RenderState::default(),
        };
        let mut html = String::new();
        pass.render_node(node, &mut html)?;

        tracing::trace!(headings = pass.state.toc.len(), bytes = html.len(), "Rendered tree");

        Ok(RenderResult {
            html,
            toc: pass.state.toc,
        })
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(NodeKind::name).collect();
        kinds.sort_unstable();
        f.debug_struct("HtmlRenderer")
            .field("handlers", &kinds)
            .finish_non_exhaustive()
    }
}

/// One render pass over a page.
pub struct RenderPass<'r> {
    renderer: &'r HtmlRenderer,
    context: &'r RenderContext,
    pub(crate) state: RenderState,
}

impl<'r> RenderPass<'r> {
    /// Configuration of this pass.
    pub fn context(&self) -> &'r RenderContext {
        self.context
    }

    /// Render a node through the handler table.
    pub fn render_node(&mut self, node: &ParseNode, out: &mut String) -> Result<(), RenderError> {
        let handler = self
            .renderer
            .handlers
            .get(&node.kind)
            .copied()
            .unwrap_or(render_element);
        handler(self, node, out)
    }

    pub fn render_children(
        &mut self,
        node: &ParseNode,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for child in &node.children {
            self.render_node(child, out)?;
        }
        Ok(())
    }

    /// Render children, or the escaped raw text of a leaf node.
    pub fn render_content(
        &mut self,
        node: &ParseNode,
        out: &mut String,
    ) -> Result<(), RenderError> {
        if node.children.is_empty() {
            out.push_str(&escape_html(&node.raw_text));
            Ok(())
        } else {
            self.render_children(node, out)
        }
    }

    /// Run the configured highlighter.
    pub fn highlight(&self, request: &HighlightRequest<'_>) -> String {
        self.renderer.highlighter.highlight(request)
    }

    /// Headings recorded so far.
    pub fn toc(&self) -> &[TocEntry] {
        &self.state.toc
    }
}

/// Default handler: a generic element per node kind.
pub fn render_element(
    pass: &mut RenderPass<'_>,
    node: &ParseNode,
    out: &mut String,
) -> Result<(), RenderError> {
    match &node.kind {
        NodeKind::Root => pass.render_children(node, out)?,
        NodeKind::Text => out.push_str(&escape_html(&node.raw_text)),
        NodeKind::Html => out.push_str(&node.raw_text),
        NodeKind::BlankSeparator => {}
        NodeKind::SoftBreak => out.push('\n'),
        NodeKind::LineBreak => void_element("br", &node.attributes, out),
        NodeKind::HorizontalRule => void_element("hr", &node.attributes, out),
        NodeKind::Image => void_element("img", &node.attributes, out),
        _ => match element_name(node) {
            Some(tag) => {
                out.push('<');
                out.push_str(&tag);
                write_attrs(&node.attributes, out);
                out.push('>');
                pass.render_content(node, out)?;
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
            None => pass.render_content(node, out)?,
        },
    }
    Ok(())
}

/// Tag name for container kinds.
fn element_name(node: &ParseNode) -> Option<Cow<'_, str>> {
    let tag = match &node.kind {
        NodeKind::Paragraph => "p",
        NodeKind::List => "ul",
        NodeKind::OrderedList => "ol",
        NodeKind::ListItem => "li",
        NodeKind::Strong => "strong",
        NodeKind::Emphasis => "em",
        NodeKind::Strikethrough => "del",
        NodeKind::Blockquote => "blockquote",
        NodeKind::CodeBlock => "pre",
        NodeKind::CodeSpan => "code",
        NodeKind::Link => "a",
        NodeKind::Table => "table",
        NodeKind::TableHead => "thead",
        NodeKind::TableBody => "tbody",
        NodeKind::TableRow => "tr",
        NodeKind::TableHeaderCell => "th",
        NodeKind::TableCell => "td",
        NodeKind::Header => {
            let level = node.level.unwrap_or(1).clamp(1, 6);
            return Some(Cow::Owned(format!("h{level}")));
        }
        NodeKind::Other(name) if is_tag_name(name) => name.as_str(),
        _ => return None,
    };
    Some(Cow::Borrowed(tag))
}

fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn void_element(tag: &str, attrs: &Attributes, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    write_attrs(attrs, out);
    out.push_str(" />");
}

/// Write attributes in order, values escaped.
pub(crate) fn write_attrs(attrs: &Attributes, out: &mut String) {
    for (name, value) in attrs.iter() {
        write_attr(name, value, out);
    }
}

pub(crate) fn write_attr(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}
