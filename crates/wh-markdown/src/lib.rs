//! Markdown to [`ParseNode`] bridge.
//!
//! The webhelp compiler consumes a generic parse tree and never reads
//! markdown text itself. This crate produces that tree from `pulldown-cmark`
//! events, so hosts and tests can start from plain markdown.
//!
//! Conventions of the produced tree:
//! - Fenced code blocks carry their info string as `class="language-<info>"`,
//!   with whitespace removed so `java {1-3}` becomes `language-java{1-3}`.
//! - Blank lines between blocks of the document root, a blockquote or a list
//!   item become [`NodeKind::BlankSeparator`] nodes.
//! - Tight list items hold their inline content directly, without a paragraph.
//! - Heading attributes (`{#id .class}`) become `id` and `class` attributes.
//!
//! # Example
//!
//! ```
//! use wh_markdown::parse;
//! use wh_nodes::NodeKind;
//!
//! let root = parse("## Basics\n\n- [Intro](intro.md)\n");
//! assert_eq!(root.kind, NodeKind::Root);
//! assert_eq!(root.children[0].level, Some(2));
//! ```

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use wh_nodes::{NodeKind, ParseNode, SourcePos};

/// Parser options used for every document.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse markdown text into a [`ParseNode`] tree rooted at [`NodeKind::Root`].
#[must_use]
pub fn parse(markdown: &str) -> ParseNode {
    let mut builder = TreeBuilder::new(markdown);
    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        builder.event(event, range.start, range.end);
    }
    builder.finish()
}

/// Node under construction.
struct Frame {
    node: ParseNode,
    /// End offset of the last block child, for blank line detection.
    last_block_end: Option<usize>,
}

/// Table being assembled; pulldown-cmark has no explicit head row or body.
struct TableFrame {
    alignments: Vec<Alignment>,
    in_head: bool,
    body_open: bool,
    cell: usize,
}

struct TreeBuilder<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
    stack: Vec<Frame>,
    tables: Vec<TableFrame>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            line_starts,
            stack: vec![Frame {
                node: ParseNode::new(NodeKind::Root),
                last_block_end: None,
            }],
            tables: Vec::new(),
        }
    }

    fn finish(mut self) -> ParseNode {
        while self.stack.len() > 1 {
            self.close(self.source.len());
        }
        self.stack
            .pop()
            .map_or_else(|| ParseNode::new(NodeKind::Root), |frame| frame.node)
    }

    fn position(&self, offset: usize) -> SourcePos {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        SourcePos {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(offset - line_start + 1).unwrap_or(u32::MAX),
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn event(&mut self, event: Event<'_>, start: usize, end: usize) {
        match event {
            Event::Start(tag) => self.start_tag(tag, start),
            Event::End(tag) => self.end_tag(tag, end),
            Event::Text(text) => self.text(&text, start),
            Event::Code(code) => {
                self.leaf(ParseNode::new(NodeKind::CodeSpan).with_raw_text(code.as_ref()), start);
            }
            Event::Html(html) => self.text(&html, start),
            Event::InlineHtml(html) => {
                self.leaf(ParseNode::new(NodeKind::Html).with_raw_text(html.as_ref()), start);
            }
            Event::SoftBreak => self.leaf(ParseNode::new(NodeKind::SoftBreak), start),
            Event::HardBreak => self.leaf(ParseNode::new(NodeKind::LineBreak), start),
            Event::Rule => {
                self.block_start(start);
                self.leaf(ParseNode::new(NodeKind::HorizontalRule), start);
                let end = content_end(self.source, end);
                self.top().last_block_end = Some(end);
            }
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, start: usize) {
        let node = match tag {
            Tag::Paragraph => self.block(NodeKind::Paragraph, start),
            Tag::Heading {
                level, id, classes, ..
            } => {
                let mut node = self.block(NodeKind::Header, start);
                node.level = Some(heading_level(level));
                if let Some(id) = id {
                    node.attributes.insert("id", id.as_ref());
                }
                if !classes.is_empty() {
                    let classes: Vec<&str> = classes.iter().map(AsRef::as_ref).collect();
                    node.attributes.insert("class", classes.join(" "));
                }
                node
            }
            Tag::BlockQuote(_) => self.block(NodeKind::Blockquote, start),
            Tag::CodeBlock(kind) => {
                let mut node = self.block(NodeKind::CodeBlock, start);
                if let CodeBlockKind::Fenced(info) = kind {
                    let info: String = info.split_whitespace().collect();
                    if !info.is_empty() {
                        node.attributes.insert("class", format!("language-{info}"));
                    }
                }
                node
            }
            Tag::HtmlBlock => self.block(NodeKind::Html, start),
            Tag::List(first) => {
                let mut node = self.block(
                    if first.is_some() {
                        NodeKind::OrderedList
                    } else {
                        NodeKind::List
                    },
                    start,
                );
                if let Some(n) = first.filter(|&n| n != 1) {
                    node.attributes.insert("start", n.to_string());
                }
                node
            }
            Tag::Item => ParseNode::new(NodeKind::ListItem),
            Tag::Table(alignments) => {
                self.tables.push(TableFrame {
                    alignments,
                    in_head: false,
                    body_open: false,
                    cell: 0,
                });
                self.block(NodeKind::Table, start)
            }
            Tag::TableHead => {
                if let Some(table) = self.tables.last_mut() {
                    table.in_head = true;
                    table.cell = 0;
                }
                self.open(ParseNode::new(NodeKind::TableHead), start);
                ParseNode::new(NodeKind::TableRow)
            }
            Tag::TableRow => {
                let opens_body = self.tables.last_mut().is_some_and(|table| {
                    table.cell = 0;
                    !std::mem::replace(&mut table.body_open, true)
                });
                if opens_body {
                    self.open(ParseNode::new(NodeKind::TableBody), start);
                }
                ParseNode::new(NodeKind::TableRow)
            }
            Tag::TableCell => self.table_cell(),
            Tag::Emphasis => ParseNode::new(NodeKind::Emphasis),
            Tag::Strong => ParseNode::new(NodeKind::Strong),
            Tag::Strikethrough => ParseNode::new(NodeKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut node = ParseNode::new(NodeKind::Link).with_attr("href", dest_url.as_ref());
                if !title.is_empty() {
                    node.attributes.insert("title", title.as_ref());
                }
                node
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut node = ParseNode::new(NodeKind::Image).with_attr("src", dest_url.as_ref());
                if !title.is_empty() {
                    node.attributes.insert("title", title.as_ref());
                }
                node
            }
            Tag::Superscript => ParseNode::new(NodeKind::Other("sup".to_owned())),
            Tag::Subscript => ParseNode::new(NodeKind::Other("sub".to_owned())),
            Tag::DefinitionList => self.block(NodeKind::Other("dl".to_owned()), start),
            Tag::DefinitionListTitle => ParseNode::new(NodeKind::Other("dt".to_owned())),
            Tag::DefinitionListDefinition => ParseNode::new(NodeKind::Other("dd".to_owned())),
            Tag::FootnoteDefinition(_) => ParseNode::new(NodeKind::Other("footnote".to_owned())),
            Tag::MetadataBlock(_) => ParseNode::new(NodeKind::Other("metadata".to_owned())),
        };
        self.open(node, start);
    }

    fn end_tag(&mut self, tag: TagEnd, end: usize) {
        match tag {
            TagEnd::TableHead => {
                // Implicit head row, then the head itself.
                self.close(end);
                self.close(end);
                if let Some(table) = self.tables.last_mut() {
                    table.in_head = false;
                }
            }
            TagEnd::TableCell => {
                self.close(end);
                if let Some(table) = self.tables.last_mut() {
                    table.cell += 1;
                }
            }
            TagEnd::Table => {
                if self.tables.pop().is_some_and(|table| table.body_open) {
                    self.close(end);
                }
                self.close(end);
            }
            TagEnd::Heading(_) => {
                let node = &mut self.top().node;
                node.raw_text = node.text_content().trim().to_owned();
                self.close(end);
            }
            TagEnd::Image => {
                let node = &mut self.top().node;
                let alt = node.text_content();
                node.children.clear();
                node.attributes.insert("alt", alt);
                self.close(end);
            }
            _ => self.close(end),
        }
    }

    fn table_cell(&self) -> ParseNode {
        let Some(table) = self.tables.last() else {
            return ParseNode::new(NodeKind::TableCell);
        };
        let kind = if table.in_head {
            NodeKind::TableHeaderCell
        } else {
            NodeKind::TableCell
        };
        let node = ParseNode::new(kind);
        match table.alignments.get(table.cell) {
            Some(Alignment::Left) => node.with_attr("style", "text-align:left"),
            Some(Alignment::Center) => node.with_attr("style", "text-align:center"),
            Some(Alignment::Right) => node.with_attr("style", "text-align:right"),
            Some(Alignment::None) | None => node,
        }
    }

    /// Create a block node, recording a blank separator before it when needed.
    fn block(&mut self, kind: NodeKind, start: usize) -> ParseNode {
        self.block_start(start);
        ParseNode::new(kind)
    }

    fn block_start(&mut self, start: usize) {
        let source = self.source;
        let frame = self.top();
        let separates = matches!(
            frame.node.kind,
            NodeKind::Root | NodeKind::Blockquote | NodeKind::ListItem
        );
        if separates
            && let Some(prev_end) = frame.last_block_end
            && has_blank_line(source, prev_end, start)
        {
            frame
                .node
                .children
                .push(ParseNode::new(NodeKind::BlankSeparator));
        }
    }

    fn open(&mut self, node: ParseNode, start: usize) {
        let node = node.with_position(self.position(start));
        self.stack.push(Frame {
            node,
            last_block_end: None,
        });
    }

    fn close(&mut self, end: usize) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let is_block = !frame.node.kind.is_inline() && frame.node.kind != NodeKind::ListItem;
        let end = content_end(self.source, end);
        let parent = self.top();
        parent.node.children.push(frame.node);
        if is_block {
            parent.last_block_end = Some(end);
        }
    }

    fn leaf(&mut self, node: ParseNode, start: usize) {
        let node = node.with_position(self.position(start));
        self.top().node.children.push(node);
    }

    fn text(&mut self, text: &str, start: usize) {
        let position = self.position(start);
        let node = &mut self.top().node;
        match node.kind {
            NodeKind::CodeBlock | NodeKind::Html => node.raw_text.push_str(text),
            _ => match node.children.last_mut() {
                Some(last) if last.kind == NodeKind::Text => last.raw_text.push_str(text),
                _ => node
                    .children
                    .push(ParseNode::text(text).with_position(position)),
            },
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Back `end` up over trailing blank lines, including lines holding only
/// blockquote markers.
///
/// Lists and blockquotes claim the blank lines that follow them.
fn content_end(source: &str, end: usize) -> usize {
    let mut end = end.min(source.len());
    loop {
        let trimmed = source[..end].trim_end_matches([' ', '\t', '\r', '\n']);
        let line_start = trimmed.rfind('\n').map_or(0, |i| i + 1);
        let line = &trimmed[line_start..];
        let markers_only = line
            .trim_matches(|c: char| c.is_whitespace() || c == '>')
            .is_empty();
        if line.is_empty() || !markers_only {
            return trimmed.len();
        }
        end = line_start;
    }
}

/// Check whether `source[start..end]` contains a line that is empty apart
/// from whitespace and blockquote markers.
fn has_blank_line(source: &str, start: usize, end: usize) -> bool {
    if start >= end || end > source.len() {
        return false;
    }
    let at_line_start = start == 0 || source.as_bytes()[start - 1] == b'\n';
    let segments: Vec<&str> = source[start..end].split('\n').collect();
    // The last segment is never terminated by a newline inside the gap.
    let full_lines = &segments[..segments.len() - 1];
    full_lines
        .iter()
        .enumerate()
        .filter(|(i, _)| *i > 0 || at_line_start)
        .any(|(_, line)| line.trim_matches(|c: char| c.is_whitespace() || c == '>').is_empty())
}
