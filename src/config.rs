//! # Router Configuration Module
//!
//! Policy flags for a [`Router`](crate::router::Router), loaded from defaults, environment
//! variables or a TOML file. The flags are read once when the router is constructed and
//! never change while it serves traffic.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `CERA_REDIRECT_TRAILING_SLASH` | `redirect_trailing_slash` | `true` |
//! | `CERA_REDIRECT_FIXED_PATH` | `redirect_fixed_path` | `true` |
//! | `CERA_HANDLE_METHOD_NOT_ALLOWED` | `handle_method_not_allowed` | `true` |
//! | `CERA_HANDLE_OPTIONS` | `handle_options` | `true` |
//! | `CERA_MUTABLE_ROUTES` | `mutable` | `false` |
//!
//! Booleans accept `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`. Unset or unparsable
//! values fall back to the default.
//!
//! ## TOML
//!
//! ```toml
//! redirect_fixed_path = false
//! mutable = true
//! ```
//!
//! Missing keys take their defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::router::RedirectPolicy;

/// Router policy flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Redirect `/foo/` to `/foo` (or the reverse) when only the other form is registered
    pub redirect_trailing_slash: bool,
    /// Redirect case- or slash-malformed paths to their registered spelling
    pub redirect_fixed_path: bool,
    /// Answer 405 with an `Allow` list when another method matches the path
    pub handle_method_not_allowed: bool,
    /// Answer OPTIONS automatically when no OPTIONS route is registered
    pub handle_options: bool,
    /// Allow re-registering a pattern, replacing its handler
    pub mutable: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
            mutable: false,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup (the environment, in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|value| parse_flag(&value))
                .unwrap_or(default)
        };
        Self {
            redirect_trailing_slash: flag(
                "CERA_REDIRECT_TRAILING_SLASH",
                defaults.redirect_trailing_slash,
            ),
            redirect_fixed_path: flag("CERA_REDIRECT_FIXED_PATH", defaults.redirect_fixed_path),
            handle_method_not_allowed: flag(
                "CERA_HANDLE_METHOD_NOT_ALLOWED",
                defaults.handle_method_not_allowed,
            ),
            handle_options: flag("CERA_HANDLE_OPTIONS", defaults.handle_options),
            mutable: flag("CERA_MUTABLE_ROUTES", defaults.mutable),
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Failed to parse router config")
    }

    /// Which redirects tree lookups may report
    #[must_use]
    pub fn redirects(&self) -> RedirectPolicy {
        RedirectPolicy {
            trailing_slash: self.redirect_trailing_slash,
            fixed_path: self.redirect_fixed_path,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load router configuration from a TOML file
///
/// Returns `Ok(Some(config))` if the file exists and parses,
/// `Ok(None)` if it doesn't exist (not an error),
/// `Err` if it exists but can't be read or parsed.
pub fn load_router_config(config_path: &Path) -> anyhow::Result<Option<RouterConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read router config: {}", config_path.display()))?;

    let config: RouterConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse router config: {}", config_path.display()))?;

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_enable_every_policy() {
        let config = RouterConfig::default();
        assert!(config.redirect_trailing_slash);
        assert!(config.redirect_fixed_path);
        assert!(config.handle_method_not_allowed);
        assert!(config.handle_options);
        assert!(!config.mutable);
        assert_eq!(config.redirects(), RedirectPolicy::all());
    }

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = [
            ("CERA_REDIRECT_FIXED_PATH", "off"),
            ("CERA_MUTABLE_ROUTES", "1"),
            ("CERA_HANDLE_OPTIONS", "sometimes"),
        ]
        .into_iter()
        .collect();
        let config = RouterConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert!(config.redirect_trailing_slash);
        assert!(!config.redirect_fixed_path);
        assert!(config.handle_method_not_allowed);
        // unparsable keeps the default
        assert!(config.handle_options);
        assert!(config.mutable);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("yes"), Some(true));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_from_toml_str_uses_defaults_for_missing_keys() {
        let config = RouterConfig::from_toml_str("handle_options = false\nmutable = true\n")
            .expect("valid toml");
        assert!(!config.handle_options);
        assert!(config.mutable);
        assert!(config.redirect_trailing_slash);
    }

    #[test]
    fn test_from_toml_str_rejects_wrong_types() {
        let err = RouterConfig::from_toml_str("mutable = \"maybe\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse router config"));
    }
}
