//! HTML renderer for webhelp parse trees.
//!
//! [`HtmlRenderer`] walks a [`ParseNode`](wh_nodes::ParseNode) tree and
//! dispatches every node through a table of [`NodeHandler`]s keyed by node
//! kind. Kinds without an entry fall back to a generic element renderer that
//! escapes text content.
//!
//! House conventions implemented by the built-in handlers:
//! - Headers get a generated id, a named anchor and an inline anchor link.
//! - Code blocks and spans get language classes; `{1-3,5}` line ranges are
//!   forwarded to the [`CodeHighlighter`].
//! - Links resolve the custom repository scheme, mark external targets,
//!   obfuscate `mailto:` addresses, prefix the base URL and rewrite `.md`
//!   targets to `.html`.
//! - Blockquotes starting with a bold label become callouts; `**See Also**`
//!   blocks become a multi-column layout.
//!
//! # Example
//!
//! ```
//! use wh_nodes::{NodeKind, ParseNode};
//! use wh_renderer::{HtmlRenderer, RenderContext};
//!
//! let page = ParseNode::new(NodeKind::Root).with_child(
//!     ParseNode::new(NodeKind::Paragraph)
//!         .with_child(ParseNode::link("/guide/intro.md", "Intro")),
//! );
//! let context = RenderContext::new("/docs");
//!
//! let result = HtmlRenderer::new().render(&page, &context).unwrap();
//! assert_eq!(
//!     result.html,
//!     r#"<p><a href="/docs/guide/intro.html"><span>Intro</span></a></p>"#
//! );
//! ```

mod context;
mod error;
mod highlight;
mod html;
mod renderer;
mod state;

pub use context::{LinkSchemeConfig, RenderContext};
pub use error::{ConfigurationError, RenderError};
pub use highlight::{
    CodeHighlighter, HighlightMode, HighlightRequest, PlainHighlighter, parse_line_ranges,
};
pub use renderer::{HtmlRenderer, NodeHandler, RenderPass, RenderResult, render_element};
pub use state::{TocEntry, escape_html, obfuscate, slugify};
