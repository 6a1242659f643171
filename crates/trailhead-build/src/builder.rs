//! Build orchestration and artifact lifecycle
//!
//! A build walks `Verifying -> Deploying -> Compiling -> Done`. Dependency
//! verification is the only gate: when it fails nothing is deployed or
//! compiled. Everything after it records failures and keeps going so a single
//! run reports as much as possible.

use crate::config::BuildConfig;
use crate::dependency::{self, VerificationResult};
use crate::deploy::{self, DeploymentReport};
use crate::driver::{CompilationDriver, CompileOutcome};
use crate::error::{BuildError, BuildResult};
use crate::invocation::CompileInvocation;
use crate::output::{Event, Reporter};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use trailhead_config::ConfigLoader;

/// Terminal state of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildVerdict {
    /// Every target compiled
    Success,
    /// Dependencies were verified but at least one target failed
    PartialFailure,
    /// Verification failed; nothing was compiled
    FailedDependencies,
}

/// Everything a build did
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub verdict: BuildVerdict,
    pub verification: VerificationResult,
    /// Absent when verification failed
    pub deployment: Option<DeploymentReport>,
    /// One outcome per target, in build order
    pub outcomes: Vec<CompileOutcome>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn success(&self) -> bool {
        self.verdict == BuildVerdict::Success
    }

    pub fn succeeded_targets(&self) -> impl Iterator<Item = &CompileOutcome> {
        self.outcomes.iter().filter(|o| o.succeeded())
    }

    pub fn failed_targets(&self) -> impl Iterator<Item = &CompileOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Overall failure, if any
    pub fn error(&self) -> Option<BuildError> {
        match self.verdict {
            BuildVerdict::Success => None,
            BuildVerdict::FailedDependencies => self.verification.error(),
            BuildVerdict::PartialFailure => Some(BuildError::TargetsFailed {
                failed: self.failed_targets().count(),
                total: self.outcomes.len(),
            }),
        }
    }
}

/// What happened to one artifact during clean
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanStatus {
    Removed,
    Absent,
    Failed { error: String },
}

/// Per-artifact clean results, in artifact order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub items: Vec<(PathBuf, CleanStatus)>,
}

impl CleanReport {
    pub fn removed(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, status)| *status == CleanStatus::Removed)
            .count()
    }

    pub fn failures(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, status)| matches!(status, CleanStatus::Failed { .. }))
            .count()
    }
}

/// Main builder for orchestrating builds
pub struct Builder {
    config: BuildConfig,
    /// Print compiler command lines
    verbose: bool,
}

impl Builder {
    /// Create a builder from an already resolved configuration
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    /// Load `trailhead.toml` (or `config_path`) for the project at
    /// `project_dir` and create a builder for it
    pub fn for_project(project_dir: impl AsRef<Path>, config_path: Option<&Path>) -> BuildResult<Self> {
        let project_dir = project_dir.as_ref();
        let root = project_dir
            .canonicalize()
            .map_err(|e| BuildError::io(project_dir, e))?;
        let project = ConfigLoader::new().load(&root, config_path)?;
        Ok(Self::new(BuildConfig::resolve(root, &project)))
    }

    /// Enable/disable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Verify dependencies without building
    pub fn check(&self, reporter: &mut dyn Reporter) -> VerificationResult {
        dependency::verify(&self.config.dependency_set(), reporter)
    }

    /// Verify, deploy, then compile every target
    pub fn build(&self, reporter: &mut dyn Reporter) -> BuildReport {
        let build_start = Instant::now();

        let banner = format!("{} BUILD SYSTEM", self.config.project_name.to_uppercase());
        reporter.report(Event::Banner(&banner));

        log::debug!("stage: verifying");
        let verification = self.check(reporter);
        if !verification.ok() {
            log::debug!("stage: failed dependencies");
            return BuildReport {
                verdict: BuildVerdict::FailedDependencies,
                verification,
                deployment: None,
                outcomes: Vec::new(),
                duration: build_start.elapsed(),
            };
        }

        log::debug!("stage: deploying");
        let deployment = deploy::deploy(&self.config.deployments, &self.config.project_root, reporter);
        if !deployment.ok() {
            reporter.report(Event::DeploymentDegraded);
        }

        log::debug!("stage: compiling {} targets", self.config.targets.len());
        let outcomes = self.compile_targets(reporter);

        let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
        let verdict = if failed == 0 {
            reporter.report(Event::BuildSucceeded {
                targets: &self.config.targets,
            });
            BuildVerdict::Success
        } else {
            reporter.report(Event::BuildFailed {
                failed,
                total: outcomes.len(),
            });
            BuildVerdict::PartialFailure
        };

        let duration = build_start.elapsed();
        log::debug!("stage: done ({:?}) in {:.2}s", verdict, duration.as_secs_f64());

        BuildReport {
            verdict,
            verification,
            deployment: Some(deployment),
            outcomes,
            duration,
        }
    }

    /// Compile every target in order; a failure never stops the loop
    fn compile_targets(&self, reporter: &mut dyn Reporter) -> Vec<CompileOutcome> {
        let driver = CompilationDriver::new(&self.config.project_root)
            .with_timeout(self.config.toolchain.timeout);

        self.config
            .targets
            .iter()
            .map(|target| {
                reporter.report(Event::CompileStarted { target });

                let invocation = CompileInvocation::build(target, &self.config.toolchain);
                let command_line = invocation.command_line();
                log::debug!("running: {}", command_line);
                if self.verbose {
                    reporter.report(Event::CommandLine(&command_line));
                }

                let outcome = driver.run(&invocation, target);
                if let Some(err) = outcome.error() {
                    log::error!("{}", err);
                }
                reporter.report(Event::CompileFinished { outcome: &outcome });
                outcome
            })
            .collect()
    }

    /// Remove every known artifact from the project root
    ///
    /// Absent files are skipped and removal errors are recorded; clean itself
    /// never fails.
    pub fn clean(&self, reporter: &mut dyn Reporter) -> CleanReport {
        reporter.report(Event::Stage("Cleaning build files..."));

        let mut report = CleanReport::default();
        for path in self.config.artifacts() {
            let status = match fs::remove_file(&path) {
                Ok(()) => {
                    let name = display_name(&path, &self.config.project_root);
                    reporter.report(Event::ArtifactRemoved { path: name });
                    CleanStatus::Removed
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => CleanStatus::Absent,
                Err(e) => {
                    log::warn!("{}", BuildError::clean_item(&path, &e));
                    let error = e.to_string();
                    reporter.report(Event::ArtifactRemoveFailed {
                        path: display_name(&path, &self.config.project_root),
                        error: &error,
                    });
                    CleanStatus::Failed { error }
                }
            };
            report.items.push((path, status));
        }

        reporter.report(Event::CleanComplete);
        report
    }

    /// Clean, then build; the clean result never gates the build
    pub fn rebuild(&self, reporter: &mut dyn Reporter) -> BuildReport {
        let cleaned = self.clean(reporter);
        if cleaned.failures() > 0 {
            log::warn!(
                "{} artifacts could not be removed, building anyway",
                cleaned.failures()
            );
        }
        self.build(reporter)
    }

    /// Known artifacts currently present on disk
    pub fn existing_artifacts(&self) -> Vec<PathBuf> {
        self.config
            .artifacts()
            .into_iter()
            .filter(|path| path.exists())
            .collect()
    }
}

/// Artifact path relative to the project root, for status lines
fn display_name<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
