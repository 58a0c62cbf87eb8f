//! Generic parse tree produced by the markdown parser.

use std::fmt;

/// Node kind vocabulary understood by the compiler.
///
/// The vocabulary is closed: anything the parser emits outside of it is
/// carried as [`NodeKind::Other`] and rendered generically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum NodeKind {
    /// Document root.
    Root,
    /// Heading; see [`ParseNode::level`].
    Header,
    Paragraph,
    /// Unordered list.
    List,
    OrderedList,
    ListItem,
    Link,
    Image,
    CodeBlock,
    CodeSpan,
    Blockquote,
    /// Run of plain text stored in [`ParseNode::raw_text`].
    Text,
    /// Blank line between two block elements.
    BlankSeparator,
    Strong,
    Emphasis,
    Strikethrough,
    LineBreak,
    SoftBreak,
    HorizontalRule,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    /// Raw HTML from the source document.
    Html,
    /// Kind outside the known vocabulary, named by the parser.
    Other(String),
}

impl NodeKind {
    /// Stable kind name, used in error messages and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::Header => "header",
            Self::Paragraph => "paragraph",
            Self::List => "list",
            Self::OrderedList => "ordered-list",
            Self::ListItem => "list-item",
            Self::Link => "link",
            Self::Image => "image",
            Self::CodeBlock => "code-block",
            Self::CodeSpan => "code-span",
            Self::Blockquote => "blockquote",
            Self::Text => "text",
            Self::BlankSeparator => "blank-separator",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Strikethrough => "strikethrough",
            Self::LineBreak => "line-break",
            Self::SoftBreak => "soft-break",
            Self::HorizontalRule => "horizontal-rule",
            Self::Table => "table",
            Self::TableHead => "table-head",
            Self::TableBody => "table-body",
            Self::TableRow => "table-row",
            Self::TableHeaderCell => "table-header-cell",
            Self::TableCell => "table-cell",
            Self::Html => "html",
            Self::Other(name) => name,
        }
    }

    /// Whether nodes of this kind live inside a paragraph-like block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Link
                | Self::Image
                | Self::CodeSpan
                | Self::Strong
                | Self::Emphasis
                | Self::Strikethrough
                | Self::LineBreak
                | Self::SoftBreak
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a node in its source document (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Ordered attribute map.
///
/// Keeps insertion order so rendered attributes come out in the order the
/// parser produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}

/// Node of the parsed document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseNode {
    pub kind: NodeKind,
    pub attributes: Attributes,
    /// Literal text for text, header, code and html nodes. Empty otherwise.
    pub raw_text: String,
    /// Heading level (1-6), headers only.
    pub level: Option<u8>,
    pub position: Option<SourcePos>,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// Create an empty node of the given kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
            raw_text: String::new(),
            level: None,
            position: None,
            children: Vec::new(),
        }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text).with_raw_text(text)
    }

    /// Create a header node whose raw text is the given title.
    #[must_use]
    pub fn header(level: u8, title: impl Into<String>) -> Self {
        let title = title.into();
        let mut node = Self::new(NodeKind::Header).with_raw_text(title.clone());
        node.level = Some(level);
        node.with_child(Self::text(title))
    }

    /// Create a link node with a single text child.
    #[must_use]
    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NodeKind::Link)
            .with_attr("href", href)
            .with_child(Self::text(text))
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = text.into();
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: SourcePos) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ParseNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = ParseNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn is(&self, kind: &NodeKind) -> bool {
        self.kind == *kind
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.kind {
            NodeKind::Text | NodeKind::CodeSpan => out.push_str(&self.raw_text),
            NodeKind::SoftBreak | NodeKind::LineBreak => out.push(' '),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
