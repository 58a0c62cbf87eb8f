//! `wh build` command implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use wh_config::{CliSettings, Config};
use wh_nodes::NavigationEntry;
use wh_nodes::href::strip_extension;
use wh_renderer::{HtmlRenderer, RenderContext, TocEntry};
use wh_toc::{KnownPages, LinkedNavigation};

use crate::error::CliError;
use crate::output::Output;
use crate::pages::{self, SourcePage};

/// Per-page navigation document written next to the rendered pages.
const NAVIGATION_FILE: &str = "navigation.json";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for rendered pages (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Prefix for site-relative links (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Revision for repository links (overrides config).
    #[arg(long, env = "WH_COMMIT")]
    commit: Option<String>,

    /// Path to configuration file (default: auto-discover webhelp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            base_url: self.base_url,
            commit: self.commit,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = &config.site_resolved;

        output.info(&format!("Source: {}", site.source_dir.display()));
        output.info(&format!("Output: {}", site.output_dir.display()));

        let summary = build_site(&config)?;
        output.build_report(summary.pages, summary.linked, &site.output_dir);
        Ok(())
    }
}

/// Counts reported after a build.
#[derive(Debug)]
struct BuildSummary {
    pages: usize,
    linked: usize,
}

/// Neighbour or ancestor of a page in `navigation.json`.
#[derive(Serialize)]
struct PageRef<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Navigation data of one page in `navigation.json`.
#[derive(Serialize)]
struct PageNavigation<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<PageRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<PageRef<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    breadcrumbs: Vec<PageRef<'a>>,
    headings: &'a [TocEntry],
}

fn build_site(config: &Config) -> Result<BuildSummary, CliError> {
    let site = &config.site_resolved;

    let entries = super::load_navigation(site)?;
    let pages = pages::scan(&site.source_dir)?;
    let known = pages::known_pages(&pages);
    let navigation = wh_toc::link(&entries, &known)?;

    let renderer = HtmlRenderer::new();
    let context = super::render_context(config);
    fs::create_dir_all(&site.output_dir)?;

    let headings = pages
        .par_iter()
        .map(|page| render_page(&renderer, &context, page, &site.output_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let document: BTreeMap<&str, PageNavigation<'_>> = pages
        .iter()
        .zip(&headings)
        .map(|(page, toc)| {
            let path = page.path.as_str();
            (path, page_navigation(&navigation, &known, path, toc))
        })
        .collect();

    write_file(&site.toc_output_path(), &wh_toc::to_json(&entries)?)?;
    write_file(
        &site.output_dir.join(NAVIGATION_FILE),
        &serde_json::to_string_pretty(&document)?,
    )?;

    Ok(BuildSummary {
        pages: pages.len(),
        linked: pages
            .iter()
            .filter(|page| navigation.links(&page.path).is_some())
            .count(),
    })
}

/// Render one page and write it next to its siblings in the output tree.
fn render_page(
    renderer: &HtmlRenderer,
    context: &RenderContext,
    page: &SourcePage,
    output_dir: &Path,
) -> Result<Vec<TocEntry>, CliError> {
    let root = wh_markdown::parse(&page.body);
    let result = renderer
        .render(&root, context)
        .map_err(|source| CliError::Render {
            path: page.path.clone(),
            source,
        })?;

    write_file(&output_dir.join(html_path(&page.path)), &result.html)?;
    tracing::debug!(page = %page.path, headings = result.toc.len(), "Rendered page");
    Ok(result.toc)
}

fn page_navigation<'a>(
    navigation: &LinkedNavigation<'a>,
    known: &'a KnownPages,
    path: &str,
    headings: &'a [TocEntry],
) -> PageNavigation<'a> {
    let links = navigation.links(path).copied().unwrap_or_default();
    let page_ref = |entry: &'a NavigationEntry| {
        let title = entry
            .source_path
            .as_ref()
            .and_then(|source| known.get(source))
            .and_then(Option::as_deref)
            .unwrap_or(entry.title.as_str());
        PageRef {
            id: &entry.id,
            title,
            url: entry.url.as_deref(),
        }
    };

    PageNavigation {
        previous: links.previous.map(page_ref),
        next: links.next.map(page_ref),
        breadcrumbs: navigation
            .breadcrumbs(path)
            .into_iter()
            .map(page_ref)
            .collect(),
        headings,
    }
}

/// Output path of a page: the source path with an `.html` extension.
fn html_path(source_path: &str) -> String {
    format!("{}.html", strip_extension(source_path))
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
