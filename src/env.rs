//! Environment variable substitution for configuration files
//!
//! Config text may reference `${VAR}` or `${VAR:-default}`. Substitution runs
//! over the raw YAML before parsing, so any scalar (endpoint, keys, seed) can
//! come from the environment.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::env;

use crate::config::ConfigError;

/// Matches `${NAME}` and `${NAME:-fallback}`
static ENV_VAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap()
});

/// Substitute environment variable references in `input`.
///
/// Unset variables without a fallback are collected and reported together.
pub fn expand_env(input: &str) -> Result<String, ConfigError> {
    expand_with(input, |name| env::var(name).ok())
}

/// Substitution against an arbitrary lookup, used by [`expand_env`].
pub fn expand_with<F>(input: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Vec<String> = Vec::new();

    let expanded = ENV_VAR_PATTERN.replace_all(input, |caps: &Captures<'_>| {
        let name = &caps[1];
        match (lookup(name), caps.get(2)) {
            (Some(value), _) => value,
            (None, Some(fallback)) => fallback.as_str().to_string(),
            (None, None) => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing.join(", ")));
    }

    Ok(expanded.into_owned())
}
