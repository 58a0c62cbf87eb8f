//! Navigation tree extraction from the outline document.

use wh_nodes::href::{is_absolute_url, strip_extension};
use wh_nodes::{NavigationEntry, NodeKind, ParseNode};

use crate::error::StructuralError;

/// Heading level that delimits navigation sections.
const SECTION_LEVEL: u8 = 2;

/// Build the navigation tree from the root of a parsed outline document.
///
/// Level-2 headings become `header` entries and unordered lists become page
/// and placeholder entries. Any other top-level node is ignored. Headers
/// immediately followed by another header are pruned as empty sections.
pub fn build(root: &ParseNode) -> Result<Vec<NavigationEntry>, StructuralError> {
    let mut entries = Vec::new();

    for node in &root.children {
        match node.kind {
            NodeKind::Header if node.level == Some(SECTION_LEVEL) => {
                entries.push(extract_header(node));
            }
            NodeKind::List => entries.extend(extract_items(node, None)?),
            _ => {}
        }
    }

    let entries = prune_empty_sections(entries);
    tracing::debug!(entry_count = entries.len(), "Navigation tree built");
    Ok(entries)
}

/// Remove headers whose section has no entries before the next header.
fn prune_empty_sections(entries: Vec<NavigationEntry>) -> Vec<NavigationEntry> {
    let mut pruned: Vec<NavigationEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.is_header() && pruned.last().is_some_and(NavigationEntry::is_header) {
            if let Some(empty) = pruned.pop() {
                tracing::debug!(title = %empty.title, "Pruned empty navigation section");
            }
        }
        pruned.push(entry);
    }
    pruned
}

fn extract_header(node: &ParseNode) -> NavigationEntry {
    let title = if node.raw_text.trim().is_empty() {
        node.text_content().trim().to_owned()
    } else {
        node.raw_text.trim().to_owned()
    };
    NavigationEntry::header(underscore_id(&title), title)
}

fn extract_items(
    list: &ParseNode,
    parent_id: Option<&str>,
) -> Result<Vec<NavigationEntry>, StructuralError> {
    list.children
        .iter()
        .filter(|child| child.kind == NodeKind::ListItem)
        .map(|item| extract_item(item, parent_id))
        .collect()
}

fn extract_item(
    item: &ParseNode,
    parent_id: Option<&str>,
) -> Result<NavigationEntry, StructuralError> {
    let (inline, rest) = split_leading_content(item);

    let Some(first) = inline.first() else {
        return Err(StructuralError::EmptyItem {
            position: item.position,
        });
    };

    let mut entry = match first.kind {
        NodeKind::Text => {
            let title = inline
                .iter()
                .map(ParseNode::text_content)
                .collect::<String>()
                .trim()
                .to_owned();
            NavigationEntry::placeholder(underscore_id(&title), title)
        }
        NodeKind::Link => extract_link(first)?,
        _ => {
            return Err(StructuralError::UnexpectedNode {
                kind: first.kind.to_string(),
                position: first.position.or(item.position),
            });
        }
    };

    if let Some(parent_id) = parent_id {
        entry.parent_id = Some(parent_id.to_owned());
    }

    for child in rest.iter().filter(|child| child.kind == NodeKind::List) {
        let children = extract_items(child, Some(&entry.id))?;
        entry.children.extend(children);
    }

    Ok(entry)
}

/// Split a list item into its leading inline content and the remaining blocks.
///
/// Loose items start with a paragraph; tight items hold inline nodes directly.
fn split_leading_content(item: &ParseNode) -> (&[ParseNode], &[ParseNode]) {
    match item.children.first() {
        Some(first) if first.kind == NodeKind::Paragraph => {
            (&first.children[..], &item.children[1..])
        }
        _ => {
            let inline_len = item
                .children
                .iter()
                .take_while(|child| child.kind.is_inline())
                .count();
            item.children.split_at(inline_len)
        }
    }
}

fn extract_link(link: &ParseNode) -> Result<NavigationEntry, StructuralError> {
    let title = link.text_content().trim().to_owned();
    let Some(href) = link.attr("href").filter(|href| !href.is_empty()) else {
        return Err(StructuralError::MissingHref {
            title,
            position: link.position,
        });
    };

    if is_absolute_url(href) {
        return Ok(NavigationEntry::external(href, title));
    }

    let source_path = href.trim_start_matches('/');
    let id = strip_extension(source_path);
    Ok(NavigationEntry::page(
        id,
        title,
        format!("{id}.html"),
        source_path,
    ))
}

/// Identifier for titles: every whitespace character becomes `_`.
fn underscore_id(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wh_nodes::{EntryType, SourcePos};

    use super::*;

    fn outline(markdown: &str) -> Vec<NavigationEntry> {
        build(&wh_markdown::parse(markdown)).unwrap()
    }

    fn summary(entries: &[NavigationEntry]) -> Vec<(EntryType, &str)> {
        entries
            .iter()
            .map(|e| (e.entry_type, e.title.as_str()))
            .collect()
    }

    #[test]
    fn test_page_entry_from_link() {
        let entries = outline("- [Introduction](/guide/intro.md)\n");

        assert_eq!(
            entries,
            vec![NavigationEntry::page(
                "guide/intro",
                "Introduction",
                "guide/intro.html",
                "guide/intro.md"
            )]
        );
    }

    #[test]
    fn test_any_extension_rewritten_to_html() {
        let entries = outline("- [Notes](notes.txt)\n- [Bare](bare)\n");

        assert_eq!(entries[0].url.as_deref(), Some("notes.html"));
        assert_eq!(entries[0].id, "notes");
        assert_eq!(entries[1].url.as_deref(), Some("bare.html"));
    }

    #[test]
    fn test_placeholder_entry_from_text() {
        let entries = outline("- Getting  Started\n");

        assert_eq!(
            entries,
            vec![NavigationEntry::placeholder("Getting__Started", "Getting  Started")]
        );
    }

    #[test]
    fn test_external_link_flagged() {
        let entries = outline("- [Issues](https://youtrack.example.com/issues)\n- [CDN](//cdn.example.com)\n");

        assert!(entries.iter().all(|e| e.is_external));
        assert_eq!(
            entries[0].url.as_deref(),
            Some("https://youtrack.example.com/issues")
        );
        assert!(entries[0].source_path.is_none());
    }

    #[test]
    fn test_header_entries_from_level_two_only() {
        let entries = outline("# Title\n\n## Basics\n\n- [A](a.md)\n\n### Minor\n");

        assert_eq!(
            summary(&entries),
            vec![(EntryType::Header, "Basics"), (EntryType::Page, "A")]
        );
        assert_eq!(entries[0].id, "Basics");
        assert!(entries[0].url.is_none());
    }

    #[test]
    fn test_nested_lists_become_children() {
        let entries = outline(
            "- Plugins\n  - [Writing](plugins/writing.md)\n    - [Actions](plugins/actions.md)\n  - [Testing](plugins/testing.md)\n",
        );

        let plugins = &entries[0];
        assert_eq!(plugins.entry_type, EntryType::Placeholder);
        assert!(plugins.parent_id.is_none());
        assert_eq!(plugins.children.len(), 2);

        let writing = &plugins.children[0];
        assert_eq!(writing.parent_id.as_deref(), Some("Plugins"));
        assert_eq!(
            writing.children[0].parent_id.as_deref(),
            Some("plugins/writing")
        );
        assert_eq!(plugins.children[1].id, "plugins/testing");
    }

    #[test]
    fn test_loose_list_items_use_first_paragraph() {
        let entries = outline("- [A](a.md)\n\n  - [B](b.md)\n\n- [C](c.md)\n");

        assert_eq!(summary(&entries), vec![(EntryType::Page, "A"), (EntryType::Page, "C")]);
        assert_eq!(entries[0].children[0].title, "B");
    }

    #[test]
    fn test_adjacent_headers_keep_the_second() {
        let entries = outline("## Empty\n\n## Basics\n\n- [A](a.md)\n");

        assert_eq!(
            summary(&entries),
            vec![(EntryType::Header, "Basics"), (EntryType::Page, "A")]
        );
    }

    #[test]
    fn test_run_of_headers_keeps_only_the_last() {
        let entries = outline("## One\n\n## Two\n\n## Three\n\n- [A](a.md)\n");

        assert_eq!(
            summary(&entries),
            vec![(EntryType::Header, "Three"), (EntryType::Page, "A")]
        );
    }

    #[test]
    fn test_trailing_header_is_kept() {
        let entries = outline("- [A](a.md)\n\n## Later\n");

        assert_eq!(
            summary(&entries),
            vec![(EntryType::Page, "A"), (EntryType::Header, "Later")]
        );
    }

    #[test]
    fn test_header_followed_by_nested_only_content_is_kept() {
        let entries = outline("## Deep\n\n- Group\n  - [A](a.md)\n\n## Next\n\n- [B](b.md)\n");

        assert_eq!(
            summary(&entries),
            vec![
                (EntryType::Header, "Deep"),
                (EntryType::Placeholder, "Group"),
                (EntryType::Header, "Next"),
                (EntryType::Page, "B"),
            ]
        );
    }

    #[test]
    fn test_other_top_level_nodes_ignored() {
        let entries = outline("Some intro paragraph.\n\n1. [Ordered](o.md)\n\n- [A](a.md)\n");

        assert_eq!(summary(&entries), vec![(EntryType::Page, "A")]);
    }

    #[test]
    fn test_unexpected_leading_node_is_structural_error() {
        let root = wh_markdown::parse("## S\n\n- **Bold** item\n");

        let err = build(&root).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::UnexpectedNode { ref kind, .. } if kind == "strong"
        ));
        assert_eq!(err.position().map(|p| p.line), Some(3));
    }

    #[test]
    fn test_empty_item_is_structural_error() {
        let root = ParseNode::new(NodeKind::Root).with_child(
            ParseNode::new(NodeKind::List).with_child(
                ParseNode::new(NodeKind::ListItem).with_position(SourcePos { line: 7, column: 1 }),
            ),
        );

        let err = build(&root).unwrap_err();
        assert!(matches!(err, StructuralError::EmptyItem { .. }));
        assert!(err.to_string().ends_with("at 7:1"));
    }

    #[test]
    fn test_link_without_href_is_structural_error() {
        let link = ParseNode::new(NodeKind::Link).with_child(ParseNode::text("Orphan"));
        let root = ParseNode::new(NodeKind::Root).with_child(
            ParseNode::new(NodeKind::List).with_child(
                ParseNode::new(NodeKind::ListItem)
                    .with_child(ParseNode::new(NodeKind::Paragraph).with_child(link)),
            ),
        );

        let err = build(&root).unwrap_err();
        assert!(matches!(err, StructuralError::MissingHref { ref title, .. } if title == "Orphan"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let source = "## Basics\n\n- [A](a.md)\n  - [B](b.md)\n- Group\n  - [C](c.md)\n";
        let root = wh_markdown::parse(source);

        assert_eq!(build(&root).unwrap(), build(&root).unwrap());
    }
}
