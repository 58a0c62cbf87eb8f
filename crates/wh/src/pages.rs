//! Markdown page discovery and front matter.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use wh_toc::KnownPages;

use crate::error::CliError;

/// Markdown page found under the source directory.
#[derive(Debug)]
pub(crate) struct SourcePage {
    /// Path relative to the source directory, `/`-separated.
    pub(crate) path: String,
    /// Title from front matter.
    pub(crate) title: Option<String>,
    /// Markdown without front matter.
    pub(crate) body: String,
}

/// Front matter fields used by the build.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
}

/// Collect every markdown page under `source_dir`, sorted by path.
///
/// Files and directories whose name starts with `_` or `.` are skipped.
pub(crate) fn scan(source_dir: &Path) -> Result<Vec<SourcePage>, CliError> {
    let pattern = format!(
        "{}/**/*.md",
        glob::Pattern::escape(&source_dir.to_string_lossy())
    );

    let mut pages = Vec::new();
    for entry in glob::glob(&pattern)? {
        let file = entry?;
        let Ok(relative) = file.strip_prefix(source_dir) else {
            continue;
        };
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        if parts.iter().any(|p| p.starts_with('_') || p.starts_with('.')) {
            continue;
        }
        if !file.is_file() {
            continue;
        }

        let path = parts.join("/");
        let content = fs::read_to_string(&file).map_err(|source| CliError::Read {
            path: file.clone(),
            source,
        })?;
        pages.push(parse_page(path, &content)?);
    }

    pages.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(count = pages.len(), dir = %source_dir.display(), "Scanned pages");
    Ok(pages)
}

/// Titles of the scanned pages, keyed by source path.
pub(crate) fn known_pages(pages: &[SourcePage]) -> KnownPages {
    pages
        .iter()
        .map(|page| (page.path.clone(), page.title.clone()))
        .collect()
}

fn parse_page(path: String, content: &str) -> Result<SourcePage, CliError> {
    let Some((yaml, body)) = split_front_matter(content) else {
        return Ok(SourcePage {
            path,
            title: None,
            body: content.to_owned(),
        });
    };

    let front_matter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(front_matter) => front_matter,
            Err(source) => return Err(CliError::FrontMatter { path, source }),
        }
    };

    Ok(SourcePage {
        path,
        title: front_matter.title,
        body: body.to_owned(),
    })
}

/// Split a `---` delimited YAML block off the start of a document.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}
