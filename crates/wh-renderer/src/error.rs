//! Render error types.

use wh_nodes::SourcePos;

/// Invalid configuration or link discovered while rendering.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Scheme link whose path does not start with `/`.
    #[error(
        "{scheme} link must be in the form {scheme}:///path/to/file (note the 3 slashes), got \"{href}\""
    )]
    MalformedSchemeLink { scheme: String, href: String },

    /// Scheme link used without the settings needed to resolve it.
    #[error("cannot resolve {scheme} link \"{href}\": link_scheme.{field} is not configured")]
    MissingSchemeConfig {
        scheme: String,
        field: &'static str,
        href: String,
    },
}

/// Error aborting a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{source}{}", location(.position.as_ref()))]
    Configuration {
        #[source]
        source: ConfigurationError,
        position: Option<SourcePos>,
    },
}

impl RenderError {
    pub(crate) fn configuration(source: ConfigurationError, position: Option<SourcePos>) -> Self {
        Self::Configuration { source, position }
    }

    /// Source position of the offending node, when known.
    pub fn position(&self) -> Option<SourcePos> {
        match self {
            Self::Configuration { position, .. } => *position,
        }
    }
}

fn location(position: Option<&SourcePos>) -> String {
    position.map(|pos| format!(" at {pos}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_names_position() {
        let err = RenderError::configuration(
            ConfigurationError::MalformedSchemeLink {
                scheme: "upsource".to_owned(),
                href: "upsource://x".to_owned(),
            },
            Some(SourcePos { line: 4, column: 9 }),
        );

        assert_eq!(
            err.to_string(),
            "upsource link must be in the form upsource:///path/to/file (note the 3 slashes), got \"upsource://x\" at 4:9"
        );
        assert_eq!(err.position(), Some(SourcePos { line: 4, column: 9 }));
    }
}
