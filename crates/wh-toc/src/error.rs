//! Error types for navigation extraction and linking.

use std::fmt;

use wh_nodes::SourcePos;

/// The outline document does not have the expected header/list shape.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    /// A list item with no leading content.
    #[error("Empty list item in table of contents{}", location(.position.as_ref()))]
    EmptyItem { position: Option<SourcePos> },
    /// A list item starting with something other than text or a link.
    #[error(
        "List item must start with text or a link, found {kind}{}",
        location(.position.as_ref())
    )]
    UnexpectedNode {
        kind: String,
        position: Option<SourcePos>,
    },
    /// A link without a target.
    #[error("Link \"{title}\" has no href{}", location(.position.as_ref()))]
    MissingHref {
        title: String,
        position: Option<SourcePos>,
    },
}

impl StructuralError {
    /// Source location of the offending node, when the parser recorded one.
    pub fn position(&self) -> Option<SourcePos> {
        match self {
            Self::EmptyItem { position }
            | Self::UnexpectedNode { position, .. }
            | Self::MissingHref { position, .. } => *position,
        }
    }
}

fn location(position: Option<&SourcePos>) -> String {
    position.map(|pos| format!(" at {pos}")).unwrap_or_default()
}

/// Page referenced by the navigation tree without a title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingTitle {
    /// Source path of the page.
    pub path: String,
}

impl fmt::Display for MissingTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// The navigation tree is inconsistent with the known pages.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A page in the navigation sequence does not exist.
    #[error("Unknown page in navigation: {path}")]
    UnknownPage { path: String },
    /// One or more pages have no title for previous/next navigation.
    #[error("Pages are missing titles for next/prev navigation: {}", join(.missing))]
    IncompleteTitles { missing: Vec<MissingTitle> },
}

fn join(missing: &[MissingTitle]) -> String {
    missing
        .iter()
        .map(|m| m.path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_includes_location() {
        let err = StructuralError::UnexpectedNode {
            kind: "strong".to_owned(),
            position: Some(SourcePos { line: 4, column: 3 }),
        };
        assert_eq!(
            err.to_string(),
            "List item must start with text or a link, found strong at 4:3"
        );
        assert_eq!(err.position(), Some(SourcePos { line: 4, column: 3 }));
    }

    #[test]
    fn test_structural_error_without_location() {
        let err = StructuralError::EmptyItem { position: None };
        assert_eq!(err.to_string(), "Empty list item in table of contents");
    }

    #[test]
    fn test_incomplete_titles_lists_every_path() {
        let err = ValidationError::IncompleteTitles {
            missing: vec![
                MissingTitle {
                    path: "a.md".to_owned(),
                },
                MissingTitle {
                    path: "b.md".to_owned(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Pages are missing titles for next/prev navigation: a.md, b.md"
        );
    }
}
