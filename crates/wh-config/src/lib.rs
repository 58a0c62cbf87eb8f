//! Configuration management for webhelp builds.
//!
//! Parses `webhelp.toml` with serde and discovers the file in the current
//! directory or its parents. CLI arguments override file values through
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! These fields support `${VAR}` and `${VAR:-default}`:
//! - `site.base_url`
//! - `link_scheme.server`
//! - `link_scheme.repository`
//! - `link_scheme.commit`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "webhelp.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    /// Override `link_scheme.commit`.
    pub commit: Option<String>,
}

/// Build configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site layout (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Rendering options.
    pub render: RenderConfig,
    /// Repository link scheme (optional section).
    pub link_scheme: Option<LinkSchemeConfig>,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    base_url: Option<String>,
    toc_input: Option<String>,
    toc_output: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Directory holding markdown pages and the TOC document.
    pub source_dir: PathBuf,
    /// Directory receiving rendered pages and navigation files.
    pub output_dir: PathBuf,
    /// Prefix for site-relative links.
    pub base_url: String,
    /// TOC document, relative to `source_dir`.
    pub toc_input: String,
    /// Navigation JSON file, relative to `output_dir`.
    pub toc_output: String,
}

impl SiteConfig {
    #[must_use]
    pub fn toc_input_path(&self) -> PathBuf {
        self.source_dir.join(&self.toc_input)
    }

    #[must_use]
    pub fn toc_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.toc_output)
    }
}

/// Rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Write generated ids on headers.
    pub auto_ids: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { auto_ids: true }
    }
}

/// Repository link scheme settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct LinkSchemeConfig {
    /// Scheme name used in links (`<scheme>:///path`).
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Repository browser host.
    #[serde(default)]
    pub server: String,
    /// Repository identifier.
    #[serde(default)]
    pub repository: String,
    /// `HEAD` or a revision identifier.
    #[serde(default = "default_commit")]
    pub commit: String,
}

impl LinkSchemeConfig {
    /// Validate that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.scheme, "link_scheme.scheme")?;
        require_non_empty(&self.server, "link_scheme.server")?;
        require_non_empty(&self.repository, "link_scheme.repository")?;
        require_non_empty(&self.commit, "link_scheme.commit")?;
        Ok(())
    }
}

fn default_scheme() -> String {
    "upsource".to_owned()
}

fn default_commit() -> String {
    "HEAD".to_owned()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`link_scheme.commit`").
        field: String,
        /// Error message (e.g., "${`GIT_COMMIT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `webhelp.toml` in the current directory and its parents, falling
    /// back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.site_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.site_resolved.base_url.clone_from(base_url);
        }
        if let (Some(commit), Some(link_scheme)) = (&settings.commit, &mut self.link_scheme) {
            link_scheme.commit.clone_from(commit);
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfigRaw::default(),
            render: RenderConfig::default(),
            link_scheme: None,
            site_resolved: SiteConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site_resolved.toc_input, "site.toc_input")?;
        require_non_empty(&self.site_resolved.toc_output, "site.toc_output")?;
        if let Some(link_scheme) = &self.link_scheme {
            link_scheme.validate()?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref base_url) = self.site.base_url {
            self.site.base_url = Some(expand::expand_env(base_url, "site.base_url")?);
        }

        if let Some(ref mut link_scheme) = self.link_scheme {
            expand::expand_field(&mut link_scheme.server, "link_scheme.server")?;
            expand::expand_field(&mut link_scheme.repository, "link_scheme.repository")?;
            expand::expand_field(&mut link_scheme.commit, "link_scheme.commit")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let site = &self.site;
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.site_resolved = SiteConfig {
            source_dir: resolve(site.source_dir.as_deref(), "docs"),
            output_dir: resolve(site.output_dir.as_deref(), "_site"),
            base_url: site.base_url.clone().unwrap_or_default(),
            toc_input: site
                .toc_input
                .clone()
                .unwrap_or_else(|| "_SUMMARY.md".to_owned()),
            toc_output: site
                .toc_output
                .clone()
                .unwrap_or_else(|| "HelpTOC.json".to_owned()),
        };
    }
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
