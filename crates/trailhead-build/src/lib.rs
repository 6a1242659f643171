//! Trailhead build orchestration engine
//!
//! Builds a native graphics application out of pre-built third-party
//! dependency trees:
//! - Dependency location and verification
//! - Compiler invocation construction
//! - Sequential compilation with per-target timeout
//! - Runtime library deployment
//! - Clean and rebuild

pub mod builder;
pub mod config;
pub mod dependency;
pub mod deploy;
pub mod driver;
pub mod error;
pub mod invocation;
pub mod output;
pub mod targets;

// Re-export main types
pub use builder::{BuildReport, BuildVerdict, Builder, CleanReport, CleanStatus};
pub use config::{BuildConfig, Toolchain};
pub use dependency::{
    verify, DependencyItem, DependencyKind, DependencySet, DependencySpec, VerificationResult,
};
pub use deploy::{deploy, DeploymentItem, DeploymentReport, DeploymentStatus};
pub use driver::{CompilationDriver, CompileOutcome, CompileStatus, DEFAULT_TIMEOUT};
pub use error::{BuildError, BuildResult};
pub use invocation::CompileInvocation;
pub use output::{ConsoleReporter, Event, OutputMode, QuietReporter, RecordingReporter, Reporter};
pub use targets::CompileTarget;

// Re-export trailhead-config types for convenience
pub use trailhead_config::ProjectConfig;
