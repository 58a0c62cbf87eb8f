//! `${VAR}` and `${VAR:-default}` expansion for `webhelp.toml` strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand references in `value` against the process environment.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |var| std::env::var(var).ok())
}

/// Expand a config field in place.
pub(crate) fn expand_field(value: &mut String, field: &str) -> Result<(), ConfigError> {
    if value.contains("${") {
        *value = expand_env(value, field)?;
    }
    Ok(())
}

/// Expand references in `value`, resolving variables through `lookup`.
///
/// Only braced references are expanded, so `$HOME` and a bare `$` stay as
/// written. An unset variable without a default is an error naming `field`.
fn expand_with<F>(value: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| {
        lookup(var).map(Some).ok_or_else(|| UnsetVar(var.to_owned()))
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);
