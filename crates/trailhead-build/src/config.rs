//! Resolved build configuration
//!
//! `BuildConfig` is derived once from the project configuration and the
//! project root, and is read-only afterwards. Every component of the engine
//! receives it (or a part of it) by reference.

use crate::deploy::DeploymentItem;
use crate::dependency::{DependencySet, DependencySpec};
use crate::targets::CompileTarget;
use std::path::{Path, PathBuf};
use std::time::Duration;
use trailhead_config::ProjectConfig;

/// Compiler settings shared by every target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: String,
    pub standard: String,
    pub optimization: String,
    pub warnings: Vec<String>,
    /// Include directories in search order
    pub include_dirs: Vec<PathBuf>,
    /// Library directories in search order
    pub lib_dirs: Vec<PathBuf>,
    pub link_libs: Vec<String>,
    pub static_runtime: Vec<String>,
    /// Per-target compile timeout
    pub timeout: Duration,
}

/// Immutable configuration for one run of the orchestrator
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project name, shown in the banner
    pub project_name: String,
    /// Compiler working directory and destination of every artifact
    pub project_root: PathBuf,
    /// Root of the third-party dependency trees
    pub dependency_root: PathBuf,
    /// Declarative dependency table, relative to `dependency_root`
    pub dependencies: Vec<DependencySpec>,
    pub toolchain: Toolchain,
    /// Runtime libraries copied next to the executables
    pub deployments: Vec<DeploymentItem>,
    /// Targets in build order
    pub targets: Vec<CompileTarget>,
}

impl BuildConfig {
    /// Resolve `project` against `project_root`
    ///
    /// Relative paths in the project configuration are interpreted against
    /// the project root, so pass an absolute root to get absolute paths.
    pub fn resolve(project_root: impl Into<PathBuf>, project: &ProjectConfig) -> Self {
        let project_root = project_root.into();
        let dependency_root = project_root.join(&project.dependencies.root);

        let mut dependencies = Vec::new();
        let mut include_dirs: Vec<PathBuf> = project
            .toolchain
            .extra_includes
            .iter()
            .map(|dir| project_root.join(dir))
            .collect();
        let mut lib_dirs = Vec::new();
        let mut deployments = Vec::new();

        for component in &project.components {
            let base = dependency_root.join(&component.dir);

            include_dirs.push(match &component.include {
                Some(include) => base.join(include),
                None => base.clone(),
            });
            if let Some(lib) = &component.lib {
                lib_dirs.push(base.join(lib));
            }
            if let (Some(runtime), Some(name)) = (&component.runtime, component.deployed_name()) {
                deployments.push(DeploymentItem::new(base.join(runtime), name));
            }

            dependencies.extend(DependencySpec::from_component(component));
        }

        let toolchain = Toolchain {
            compiler: project.toolchain.compiler.clone(),
            standard: project.toolchain.standard.clone(),
            optimization: project.toolchain.optimization.clone(),
            warnings: project.toolchain.warnings.clone(),
            include_dirs,
            lib_dirs,
            link_libs: project.toolchain.link_libs.clone(),
            static_runtime: project.toolchain.static_runtime.clone(),
            timeout: project.timeout(),
        };

        Self {
            project_name: project.project.name.clone(),
            project_root,
            dependency_root,
            dependencies,
            toolchain,
            deployments,
            targets: project.targets.iter().map(CompileTarget::from).collect(),
        }
    }

    /// Resolve the dependency table against the dependency root
    pub fn dependency_set(&self) -> DependencySet {
        DependencySet::locate(&self.dependency_root, &self.dependencies)
    }

    /// Every file the build may produce in the project root: target outputs
    /// first, then deployed runtime libraries
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.targets
            .iter()
            .map(|target| target.artifact_path(&self.project_root))
            .chain(
                self.deployments
                    .iter()
                    .map(|item| item.destination(&self.project_root)),
            )
            .collect()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}
