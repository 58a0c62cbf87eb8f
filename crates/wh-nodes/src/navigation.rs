//! Navigation tree entries.

/// Kind of a navigation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum EntryType {
    /// Section label from a level-2 heading. Never linkable.
    Header,
    /// Linkable page, local or external.
    Page,
    /// Plain-text label inside the tree.
    Placeholder,
}

/// One node of the navigation tree.
///
/// `header` and `placeholder` entries never carry a `url` or `source_path`.
/// External pages carry a `url` but no `source_path`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationEntry {
    /// Stable identifier derived from the title or path.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Relative `.html` URL (or the verbatim href for external pages).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub url: Option<String>,
    /// Markdown source path relative to the source root.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "path", default, skip_serializing_if = "Option::is_none")
    )]
    pub source_path: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub entry_type: EntryType,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub parent_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub is_external: bool,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "pages", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<NavigationEntry>,
}

#[cfg(feature = "serde")]
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl NavigationEntry {
    /// Create a section header entry.
    #[must_use]
    pub fn header(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::bare(id.into(), title.into(), EntryType::Header)
    }

    /// Create a placeholder entry.
    #[must_use]
    pub fn placeholder(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::bare(id.into(), title.into(), EntryType::Placeholder)
    }

    /// Create a local page entry.
    #[must_use]
    pub fn page(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            source_path: Some(source_path.into()),
            ..Self::bare(id.into(), title.into(), EntryType::Page)
        }
    }

    /// Create an external page entry.
    #[must_use]
    pub fn external(href: impl Into<String>, title: impl Into<String>) -> Self {
        let href = href.into();
        Self {
            url: Some(href.clone()),
            is_external: true,
            ..Self::bare(href, title.into(), EntryType::Page)
        }
    }

    fn bare(id: String, title: String, entry_type: EntryType) -> Self {
        Self {
            id,
            title,
            url: None,
            source_path: None,
            entry_type,
            parent_id: None,
            is_external: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<NavigationEntry>) -> Self {
        self.children = children;
        self
    }

    pub fn is_header(&self) -> bool {
        self.entry_type == EntryType::Header
    }

    /// Pre-order iterator over this entry and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &NavigationEntry> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let entry = stack.pop()?;
            stack.extend(entry.children.iter().rev());
            Some(entry)
        })
    }
}
