/// Build system error types
///
/// Only `Config` and `Io` are ever returned through `BuildResult`. The other
/// variants classify per-item failures that the orchestrator records in its
/// reports and logs, without aborting the run.
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use trailhead_config::ConfigError;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing dependency '{name}' at {path}")]
    MissingDependency { name: String, path: PathBuf },

    #[error("Dependency verification failed: missing {}", .missing.join(", "))]
    DependencyVerificationFailed { missing: Vec<String> },

    #[error("Failed to deploy '{name}': {error}")]
    DeploymentFailure { name: String, error: String },

    #[error("Compilation of '{target}' timed out after {}s", .timeout.as_secs())]
    CompileTimeout { target: String, timeout: Duration },

    #[error("Compilation of '{target}' could not run: {error}")]
    CompileProcessError { target: String, error: String },

    #[error("Compilation of '{target}' failed with {}", describe_exit(.code))]
    CompileNonZeroExit { target: String, code: Option<i32> },

    #[error("Output file not created: {}", .path.display())]
    ArtifactNotProduced { target: String, path: PathBuf },

    #[error("Failed to remove {}: {error}", .path.display())]
    CleanItemFailure { path: PathBuf, error: String },

    #[error("{failed} of {total} targets failed to build")]
    TargetsFailed { failed: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error at {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }

    /// Create a deployment failure
    pub fn deployment(name: impl Into<String>, error: impl ToString) -> Self {
        Self::DeploymentFailure {
            name: name.into(),
            error: error.to_string(),
        }
    }

    /// Create a clean failure for one artifact
    pub fn clean_item(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::CleanItemFailure {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}
