//! Trailhead Configuration System
//!
//! Describes everything the build orchestrator needs to know about a project:
//! - Toolchain settings (compiler, language standard, flags, timeout)
//! - Third-party components under the dependency root
//! - Compile targets (source file -> executable)
//!
//! # Configuration Hierarchy
//!
//! Configuration is assembled in the following order (later overrides earlier):
//! 1. Built-in defaults (the Hiking Simulator layout)
//! 2. Project config (./trailhead.toml), section by section
//! 3. Environment variables (TRAILHEAD_*)
//!
//! The result is validated once and treated as immutable afterwards.
//!
//! # Example
//!
//! ```no_run
//! use trailhead_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load(Path::new("."), None).unwrap();
//! println!("building {} targets", config.targets.len());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use project::{
    ComponentConfig, DependenciesConfig, ProjectConfig, ProjectSection, TargetConfig,
    ToolchainConfig,
};
