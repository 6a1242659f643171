/// Compile targets and artifact paths
use serde::Serialize;
use std::path::{Path, PathBuf};
use trailhead_config::TargetConfig;

/// One source file compiled into one executable
///
/// Both paths are relative to the project root, which is also the compiler's
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileTarget {
    /// Source file
    pub source: PathBuf,
    /// Output executable
    pub output: PathBuf,
    /// Shown in the post-build hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CompileTarget {
    /// Create a new compile target
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Location of the output artifact under the given project root
    pub fn artifact_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.output)
    }

    /// Short label used in logs and error messages
    pub fn label(&self) -> String {
        self.source.display().to_string()
    }
}

impl From<&TargetConfig> for CompileTarget {
    fn from(config: &TargetConfig) -> Self {
        Self {
            source: config.source.clone(),
            output: config.output.clone(),
            description: config.description.clone(),
        }
    }
}

impl std::fmt::Display for CompileTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.output.display())
    }
}

/// Human-readable artifact size in megabytes
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
