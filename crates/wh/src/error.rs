//! CLI error types.

use std::path::PathBuf;

use wh_config::ConfigError;
use wh_renderer::RenderError;
use wh_toc::{StructuralError, ValidationError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOC document: {0}")]
    Structure(#[from] StructuralError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{path}: {source}")]
    Render { path: String, source: RenderError },

    #[error("{path}: invalid front matter: {source}")]
    FrontMatter {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{0}")]
    Glob(#[from] glob::GlobError),
}
