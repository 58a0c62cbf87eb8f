//! Per-build render configuration.

use crate::error::ConfigurationError;

/// Revision marker that resolves repository links against the branch head.
const HEAD: &str = "HEAD";

/// Immutable configuration shared by every page of a build.
#[derive(Clone, Debug)]
pub struct RenderContext {
    /// Prefix applied to site-relative link targets and image sources.
    pub base_url: String,
    /// Resolution settings for repository file links.
    pub link_scheme: LinkSchemeConfig,
    /// Write generated `id` attributes on headers without an explicit one.
    pub auto_ids: bool,
}

impl RenderContext {
    /// Create a context with the given base URL and default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_link_scheme(mut self, link_scheme: LinkSchemeConfig) -> Self {
        self.link_scheme = link_scheme;
        self
    }

    #[must_use]
    pub fn with_auto_ids(mut self, auto_ids: bool) -> Self {
        self.auto_ids = auto_ids;
        self
    }

    /// Prefix a site-relative path with the base URL.
    pub(crate) fn prefix_base(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            link_scheme: LinkSchemeConfig::default(),
            auto_ids: true,
        }
    }
}

/// Settings for links of the form `<scheme>:///path/to/file`.
///
/// Such links resolve to
/// `https://<server>/<repository>/file/<revision>/path/to/file` where the
/// revision is `HEAD` or `<repository>-<commit>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSchemeConfig {
    pub scheme: String,
    pub server: Option<String>,
    pub repository: Option<String>,
    /// `HEAD` or a revision identifier.
    pub commit: Option<String>,
}

impl Default for LinkSchemeConfig {
    fn default() -> Self {
        Self {
            scheme: "upsource".to_owned(),
            server: None,
            repository: None,
            commit: None,
        }
    }
}

impl LinkSchemeConfig {
    /// Create a fully configured scheme.
    #[must_use]
    pub fn new(
        scheme: impl Into<String>,
        server: impl Into<String>,
        repository: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            server: Some(server.into()),
            repository: Some(repository.into()),
            commit: Some(commit.into()),
        }
    }

    /// Path portion of `href` if it uses this scheme.
    fn strip_scheme<'a>(&self, href: &'a str) -> Option<&'a str> {
        href.strip_prefix(self.scheme.as_str())?.strip_prefix("://")
    }

    /// Whether `href` uses this scheme.
    pub fn matches(&self, href: &str) -> bool {
        !self.scheme.is_empty() && self.strip_scheme(href).is_some()
    }

    /// Resolve a scheme link to a repository file URL.
    ///
    /// Links not using the scheme are returned unchanged.
    ///
    /// ```
    /// use wh_renderer::LinkSchemeConfig;
    ///
    /// let config = LinkSchemeConfig::new("upsource", "git.example.com", "proj", "abc123");
    /// assert_eq!(
    ///     config.resolve("upsource:///src/Main.java").unwrap(),
    ///     "https://git.example.com/proj/file/proj-abc123/src/Main.java"
    /// );
    /// ```
    pub fn resolve(&self, href: &str) -> Result<String, ConfigurationError> {
        if !self.matches(href) {
            return Ok(href.to_owned());
        }
        let path = self.strip_scheme(href).unwrap_or_default();
        if !path.starts_with('/') {
            return Err(ConfigurationError::MalformedSchemeLink {
                scheme: self.scheme.clone(),
                href: href.to_owned(),
            });
        }

        let server = self.require(self.server.as_deref(), "server", href)?;
        let repository = self.require(self.repository.as_deref(), "repository", href)?;
        let commit = self.require(self.commit.as_deref(), "commit", href)?;
        let revision = if commit == HEAD {
            HEAD.to_owned()
        } else {
            format!("{repository}-{commit}")
        };

        Ok(format!("https://{server}/{repository}/file/{revision}{path}"))
    }

    fn require<'a>(
        &self,
        value: Option<&'a str>,
        field: &'static str,
        href: &str,
    ) -> Result<&'a str, ConfigurationError> {
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingSchemeConfig {
                scheme: self.scheme.clone(),
                field,
                href: href.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(commit: &str) -> LinkSchemeConfig {
        LinkSchemeConfig::new("upsource", "git.example.com", "proj", commit)
    }

    #[test]
    fn test_resolve_head() {
        assert_eq!(
            config("HEAD").resolve("upsource:///src/Main.java").unwrap(),
            "https://git.example.com/proj/file/HEAD/src/Main.java"
        );
    }

    #[test]
    fn test_resolve_commit() {
        assert_eq!(
            config("abc123").resolve("upsource:///src/Main.java").unwrap(),
            "https://git.example.com/proj/file/proj-abc123/src/Main.java"
        );
    }

    #[test]
    fn test_resolve_passes_other_links() {
        assert_eq!(config("HEAD").resolve("guide.md").unwrap(), "guide.md");
        assert_eq!(
            config("HEAD").resolve("https://example.com").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_two_slashes_is_malformed() {
        let err = config("HEAD").resolve("upsource://src/Main.java").unwrap_err();

        assert!(matches!(err, ConfigurationError::MalformedSchemeLink { .. }));
        assert!(err.to_string().contains("upsource://src/Main.java"));
    }

    #[test]
    fn test_missing_server_is_reported() {
        let config = LinkSchemeConfig {
            server: None,
            ..config("HEAD")
        };

        let err = config.resolve("upsource:///a.java").unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::MissingSchemeConfig { field: "server", .. }
        ));
    }

    #[test]
    fn test_custom_scheme_name() {
        let config = LinkSchemeConfig::new("repo", "code.example.com", "app", "HEAD");

        assert!(config.matches("repo:///lib.rs"));
        assert!(!config.matches("upsource:///lib.rs"));
        assert!(!config.matches("repository:///lib.rs"));
    }

    #[test]
    fn test_default_context_prefixes_nothing() {
        let ctx = RenderContext::default();

        assert!(ctx.auto_ids);
        assert_eq!(ctx.prefix_base("/a.html"), "/a.html");
        assert_eq!(RenderContext::new("/docs/").prefix_base("/a.html"), "/docs/a.html");
    }
}
