//! CLI configuration via environment variables
//!
//! Project settings live in `trailhead.toml`. The environment only controls
//! presentation.

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Default to a JSON build report (TRAILHEAD_DIAGNOSTICS=json)
    pub default_json: bool,
    /// Disable colored output (TRAILHEAD_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            default_json: lookup("TRAILHEAD_DIAGNOSTICS")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            no_color: lookup("TRAILHEAD_NO_COLOR").is_some() || lookup("NO_COLOR").is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(config_with(&[]), Config::default());
    }

    #[test]
    fn test_config_json_diagnostics() {
        assert!(config_with(&[("TRAILHEAD_DIAGNOSTICS", "JSON")]).default_json);
        assert!(!config_with(&[("TRAILHEAD_DIAGNOSTICS", "text")]).default_json);
    }

    #[test]
    fn test_config_no_color() {
        assert!(config_with(&[("TRAILHEAD_NO_COLOR", "1")]).no_color);
        // Also the cross-tool convention
        assert!(config_with(&[("NO_COLOR", "")]).no_color);
    }
}
