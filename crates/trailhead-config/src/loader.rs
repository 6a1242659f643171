//! Configuration Loader
//!
//! Assembles the project configuration with proper precedence:
//! 1. Built-in defaults - lowest priority
//! 2. Project config (./trailhead.toml) - overrides defaults
//! 3. Environment variables (TRAILHEAD_*) - overrides project
//! 4. CLI flags - highest priority (handled by caller)

use crate::project::ProjectConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "trailhead.toml";

/// Configuration loader
pub struct ConfigLoader {
    /// Whether TRAILHEAD_* environment variables are applied
    env_overrides: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            env_overrides: true,
        }
    }

    /// Enable or disable environment variable overrides
    pub fn with_env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    /// Load the configuration for the project at `project_dir`
    ///
    /// An explicit `config_path` must exist. Without one, `trailhead.toml` in
    /// the project directory is used when present and the built-in defaults
    /// otherwise.
    pub fn load(&self, project_dir: &Path, config_path: Option<&Path>) -> ConfigResult<ProjectConfig> {
        let config = match config_path {
            Some(path) => ProjectConfig::load_from_file(path)?,
            None => {
                let default_path = project_dir.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    ProjectConfig::load_from_file(&default_path)?
                } else {
                    ProjectConfig::default()
                }
            }
        };

        if !self.env_overrides {
            return Ok(config);
        }

        let config = apply_overrides(config, |key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment overrides using the given variable lookup
///
/// - TRAILHEAD_CXX: compiler executable
/// - TRAILHEAD_TIMEOUT: per-target timeout in seconds
/// - TRAILHEAD_DEPS_DIR: dependency root
pub fn apply_overrides<F>(mut config: ProjectConfig, lookup: F) -> ConfigResult<ProjectConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(compiler) = lookup("TRAILHEAD_CXX") {
        config.toolchain.compiler = compiler;
    }

    if let Some(timeout) = lookup("TRAILHEAD_TIMEOUT") {
        config.toolchain.timeout_secs =
            timeout.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "TRAILHEAD_TIMEOUT".to_string(),
                reason: format!("'{}' is not a number of seconds", timeout),
            })?;
    }

    if let Some(root) = lookup("TRAILHEAD_DEPS_DIR") {
        config.dependencies.root = PathBuf::from(root);
    }

    Ok(config)
}
