//! CLI command implementations.

mod build;
mod toc;

use std::fs;

use wh_config::{Config, SiteConfig};
use wh_nodes::NavigationEntry;
use wh_renderer::{LinkSchemeConfig, RenderContext};

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use toc::TocArgs;

/// Parse the TOC document and build the navigation tree.
fn load_navigation(site: &SiteConfig) -> Result<Vec<NavigationEntry>, CliError> {
    let path = site.toc_input_path();
    let source = fs::read_to_string(&path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })?;
    let root = wh_markdown::parse(&source);
    Ok(wh_toc::build(&root)?)
}

/// Render settings for a loaded configuration.
fn render_context(config: &Config) -> RenderContext {
    let context = RenderContext::new(config.site_resolved.base_url.clone())
        .with_auto_ids(config.render.auto_ids);

    match &config.link_scheme {
        Some(scheme) => context.with_link_scheme(LinkSchemeConfig::new(
            scheme.scheme.clone(),
            scheme.server.clone(),
            scheme.repository.clone(),
            scheme.commit.clone(),
        )),
        None => context,
    }
}
