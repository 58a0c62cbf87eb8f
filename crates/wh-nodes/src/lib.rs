//! Shared data model for the webhelp compiler.
//!
//! Two families of types live here:
//! - [`ParseNode`]: the generic document tree handed over by the markdown
//!   parser. The compiler only reads it; every transformation builds new values.
//! - [`NavigationEntry`]: one node of the navigation tree built from the
//!   table of contents document.
//!
//! The [`href`] module holds the URL classification helpers shared by the
//! TOC builder and the HTML renderer.
//!
//! # Example
//!
//! ```
//! use wh_nodes::{NodeKind, ParseNode};
//!
//! let link = ParseNode::new(NodeKind::Link)
//!     .with_attr("href", "/guide/intro.md")
//!     .with_child(ParseNode::text("Intro"));
//!
//! assert_eq!(link.attr("href"), Some("/guide/intro.md"));
//! assert_eq!(link.text_content(), "Intro");
//! ```

pub mod href;
mod navigation;
mod node;

pub use navigation::{EntryType, NavigationEntry};
pub use node::{Attributes, NodeKind, ParseNode, SourcePos};
