//! Navigation tree extraction and linking.
//!
//! The table of contents is authored as a markdown outline: level-2 headings
//! delimit sections and nested bullet lists encode the page tree. This crate
//! turns the parsed outline into [`NavigationEntry`] values and links pages
//! into a reading sequence.
//!
//! - [`build`]: extracts the navigation tree and prunes empty sections.
//! - [`link`]: validates the tree against the known pages and computes
//!   previous/next neighbours in reading order.
//! - [`to_json`]: serializes the tree for the site front end.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use wh_nodes::{NodeKind, ParseNode};
//!
//! let item = |href: &str, title: &str| {
//!     ParseNode::new(NodeKind::ListItem).with_child(
//!         ParseNode::new(NodeKind::Paragraph).with_child(ParseNode::link(href, title)),
//!     )
//! };
//! let root = ParseNode::new(NodeKind::Root).with_child(
//!     ParseNode::new(NodeKind::List)
//!         .with_child(item("intro.md", "Intro"))
//!         .with_child(item("setup.md", "Setup")),
//! );
//!
//! let entries = wh_toc::build(&root).unwrap();
//! let pages = HashMap::from([
//!     ("intro.md".to_owned(), Some("Intro".to_owned())),
//!     ("setup.md".to_owned(), Some("Setup".to_owned())),
//! ]);
//! let nav = wh_toc::link(&entries, &pages).unwrap();
//!
//! let intro = nav.links("intro.md").unwrap();
//! assert_eq!(intro.next.map(|e| e.title.as_str()), Some("Setup"));
//! ```

mod builder;
mod error;
mod json;
mod linker;

pub use builder::build;
pub use error::{MissingTitle, StructuralError, ValidationError};
pub use json::{page_id, to_json};
pub use linker::{KnownPages, LinkedNavigation, PageLinks, link};
pub use wh_nodes::{EntryType, NavigationEntry};
