//! Navigation validation and previous/next linking.
//!
//! Pages are linked in reading order: a pre-order walk of the navigation
//! tree where children come before the next sibling. Headers, placeholders
//! and external pages have no source path, so they are skipped without
//! breaking the chain.

use std::collections::{HashMap, HashSet};

use wh_nodes::NavigationEntry;

use crate::error::{MissingTitle, ValidationError};

/// Known pages of the site: source path to page title.
pub type KnownPages = HashMap<String, Option<String>>;

/// Reading-order neighbours of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageLinks<'a> {
    pub previous: Option<&'a NavigationEntry>,
    pub next: Option<&'a NavigationEntry>,
}

/// Entry in the flattened navigation tree.
#[derive(Debug)]
struct FlatEntry<'a> {
    entry: &'a NavigationEntry,
    parent: Option<usize>,
}

/// Validated navigation tree with previous/next links per page.
///
/// Borrows the tree it was built from; nothing is mutated after linking,
/// so the value can be shared freely between render workers.
#[derive(Debug)]
pub struct LinkedNavigation<'a> {
    entries: &'a [NavigationEntry],
    flat: Vec<FlatEntry<'a>>,
    path_index: HashMap<&'a str, usize>,
    links: HashMap<&'a str, PageLinks<'a>>,
}

/// Validate the navigation tree against the known pages and link pages.
///
/// Fails with [`ValidationError::UnknownPage`] on the first page that is not
/// in `pages`, and with [`ValidationError::IncompleteTitles`] listing every
/// page without a title.
pub fn link<'a>(
    entries: &'a [NavigationEntry],
    pages: &KnownPages,
) -> Result<LinkedNavigation<'a>, ValidationError> {
    let flat = flatten(entries);
    let chain: Vec<(&'a str, &'a NavigationEntry)> = flat
        .iter()
        .filter_map(|f| f.entry.source_path.as_deref().map(|path| (path, f.entry)))
        .collect();

    let mut missing = Vec::new();
    let mut seen = HashSet::new();
    for &(path, _) in &chain {
        let Some(title) = pages.get(path) else {
            return Err(ValidationError::UnknownPage {
                path: path.to_owned(),
            });
        };
        let untitled = title.as_deref().is_none_or(|t| t.trim().is_empty());
        if untitled && seen.insert(path) {
            tracing::warn!(path, "Page is missing title for next/prev navigation");
            missing.push(MissingTitle {
                path: path.to_owned(),
            });
        }
    }
    if !missing.is_empty() {
        return Err(ValidationError::IncompleteTitles { missing });
    }

    let links = chain
        .iter()
        .enumerate()
        .map(|(i, &(path, _))| {
            let links = PageLinks {
                previous: i.checked_sub(1).map(|j| chain[j].1),
                next: chain.get(i + 1).map(|&(_, entry)| entry),
            };
            (path, links)
        })
        .collect();

    let path_index = flat
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.entry.source_path.as_deref().map(|path| (path, i)))
        .collect();

    tracing::debug!(page_count = chain.len(), "Navigation linked");

    Ok(LinkedNavigation {
        entries,
        flat,
        path_index,
        links,
    })
}

/// Flatten the tree in pre-order, recording each entry's parent index.
fn flatten(entries: &[NavigationEntry]) -> Vec<FlatEntry<'_>> {
    fn visit<'a>(entry: &'a NavigationEntry, parent: Option<usize>, out: &mut Vec<FlatEntry<'a>>) {
        let index = out.len();
        out.push(FlatEntry { entry, parent });
        for child in &entry.children {
            visit(child, Some(index), out);
        }
    }

    let mut out = Vec::new();
    for entry in entries {
        visit(entry, None, &mut out);
    }
    out
}

impl<'a> LinkedNavigation<'a> {
    /// Top-level navigation entries, for menus.
    pub fn entries(&self) -> &'a [NavigationEntry] {
        self.entries
    }

    /// Previous/next neighbours of a page.
    pub fn links(&self, source_path: &str) -> Option<&PageLinks<'a>> {
        self.links.get(source_path)
    }

    /// Iterate over `(source_path, links)` for every linked page.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &PageLinks<'a>)> {
        self.links.iter().map(|(path, links)| (*path, links))
    }

    /// Number of linked pages.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Ancestor entries of a page, root first, excluding the page itself.
    ///
    /// Returns an empty list for pages not in the tree.
    pub fn breadcrumbs(&self, source_path: &str) -> Vec<&'a NavigationEntry> {
        let Some(&index) = self.path_index.get(source_path) else {
            return Vec::new();
        };

        let mut ancestors = Vec::new();
        let mut current = self.flat[index].parent;
        while let Some(i) = current {
            ancestors.push(self.flat[i].entry);
            current = self.flat[i].parent;
        }
        ancestors.reverse();
        ancestors
    }
}
