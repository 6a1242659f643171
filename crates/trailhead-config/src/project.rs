//! Project Configuration (trailhead.toml)
//!
//! Every section is optional. A section present in the file replaces the
//! built-in default for that section; missing keys inside a table fall back
//! to the defaults.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Project configuration from trailhead.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ProjectConfig {
    /// Project metadata
    pub project: ProjectSection,

    /// Compiler toolchain settings
    pub toolchain: ToolchainConfig,

    /// Location of the third-party dependency trees
    pub dependencies: DependenciesConfig,

    /// Third-party components, in verification order
    #[serde(rename = "component")]
    pub components: Vec<ComponentConfig>,

    /// Compile targets, in build order
    #[serde(rename = "target")]
    pub targets: Vec<TargetConfig>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ProjectSection {
    /// Display name used in the build banner
    pub name: String,
}

/// Compiler toolchain settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ToolchainConfig {
    /// Compiler executable, looked up on PATH
    pub compiler: String,

    /// Language standard passed as `-std=<standard>`
    pub standard: String,

    /// Optimization level passed as `-O<optimization>`
    pub optimization: String,

    /// Warning flags, verbatim
    pub warnings: Vec<String>,

    /// Include directories relative to the project root, searched before
    /// component headers
    pub extra_includes: Vec<PathBuf>,

    /// Libraries passed as `-l<name>`, in link order
    pub link_libs: Vec<String>,

    /// Flags appended at the very end of the link line
    pub static_runtime: Vec<String>,

    /// Per-target compile timeout in seconds
    pub timeout_secs: u64,
}

/// Dependency tree location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DependenciesConfig {
    /// Dependency root, relative to the project root unless absolute
    pub root: PathBuf,
}

/// A third-party component living under the dependency root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Component name (e.g. "SDL2")
    pub name: String,

    /// Component directory relative to the dependency root
    pub dir: PathBuf,

    /// Header directory relative to `dir`; the component root when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,

    /// Library directory relative to `dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<PathBuf>,

    /// Runtime shared library relative to `dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<PathBuf>,

    /// File name the runtime library is deployed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_as: Option<String>,
}

/// A compile target: one source file producing one executable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Source file relative to the project root
    pub source: PathBuf,

    /// Output executable relative to the project root
    pub output: PathBuf,

    /// Shown next to the executable in the post-build hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project: ProjectSection::default(),
            toolchain: ToolchainConfig::default(),
            dependencies: DependenciesConfig::default(),
            components: default_components(),
            targets: default_targets(),
        }
    }
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: "Hiking Simulator".to_string(),
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            standard: "c++17".to_string(),
            optimization: "2".to_string(),
            warnings: vec!["-Wall".to_string()],
            extra_includes: vec![PathBuf::from(".")],
            link_libs: ["mingw32", "SDL2main", "SDL2", "glew32", "opengl32"]
                .iter()
                .map(|lib| lib.to_string())
                .collect(),
            static_runtime: vec!["-static-libgcc".to_string(), "-static-libstdc++".to_string()],
            timeout_secs: 60,
        }
    }
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dependencies"),
        }
    }
}

fn default_components() -> Vec<ComponentConfig> {
    vec![
        ComponentConfig {
            name: "SDL2".to_string(),
            dir: PathBuf::from("SDL2-2.28.5/x86_64-w64-mingw32"),
            include: Some(PathBuf::from("include")),
            lib: Some(PathBuf::from("lib")),
            runtime: Some(PathBuf::from("bin/SDL2.dll")),
            deploy_as: None,
        },
        ComponentConfig {
            name: "GLEW".to_string(),
            dir: PathBuf::from("glew-2.2.0"),
            include: Some(PathBuf::from("include")),
            lib: Some(PathBuf::from("lib/Release/x64")),
            runtime: Some(PathBuf::from("bin/Release/x64/glew32.dll")),
            deploy_as: None,
        },
        ComponentConfig {
            name: "GLM".to_string(),
            dir: PathBuf::from("glm"),
            include: None,
            lib: None,
            runtime: None,
            deploy_as: None,
        },
    ]
}

fn default_targets() -> Vec<TargetConfig> {
    vec![
        TargetConfig {
            source: PathBuf::from("main.cpp"),
            output: PathBuf::from("hiking.exe"),
            description: Some("main game".to_string()),
        },
        TargetConfig {
            source: PathBuf::from("main_shaders.cpp"),
            output: PathBuf::from("shaders.exe"),
            description: Some("shader development tool".to_string()),
        },
    ]
}

impl ComponentConfig {
    /// Name the runtime library is deployed under, if the component ships one
    pub fn deployed_name(&self) -> Option<String> {
        let runtime = self.runtime.as_ref()?;
        self.deploy_as.clone().or_else(|| {
            runtime
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.toolchain.compiler.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "toolchain.compiler".to_string(),
                reason: "compiler cannot be empty".to_string(),
            });
        }

        if self.toolchain.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "toolchain.timeout_secs".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        if self.targets.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[target]] is required".to_string(),
            ));
        }

        let mut component_names = HashSet::new();
        for component in &self.components {
            if component.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "component.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }
            if !component_names.insert(component.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate component '{}'",
                    component.name
                )));
            }
            if component.deploy_as.is_some() && component.runtime.is_none() {
                return Err(ConfigError::InvalidValue {
                    field: format!("component.{}.deploy_as", component.name),
                    reason: "deploy_as requires a runtime library".to_string(),
                });
            }
        }

        // Targets and deployed libraries share the project root, so every
        // artifact name has to be unique across both.
        let mut artifacts = HashSet::new();
        for target in &self.targets {
            if target.source.as_os_str().is_empty() || target.output.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "target".to_string(),
                    reason: "source and output cannot be empty".to_string(),
                });
            }
            if !artifacts.insert(target.output.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate target output '{}'",
                    target.output.display()
                )));
            }
        }
        for name in self.components.iter().filter_map(|c| c.deployed_name()) {
            if !artifacts.insert(PathBuf::from(&name)) {
                return Err(ConfigError::ValidationError(format!(
                    "runtime library '{}' collides with another artifact",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Per-target compile timeout
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.toolchain.timeout_secs)
    }
}
