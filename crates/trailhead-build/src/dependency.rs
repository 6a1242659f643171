//! Dependency location and verification
//!
//! Third-party components are never built here. The locator only computes
//! where their headers, libraries and runtime binaries are expected to live,
//! and the verifier checks that they are actually there.

use crate::error::BuildError;
use crate::output::{Event, Reporter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use trailhead_config::ComponentConfig;

/// What kind of filesystem entry a dependency is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Directory,
    File,
}

impl DependencyKind {
    fn is_satisfied_by(&self, path: &Path) -> bool {
        match self {
            Self::Directory => path.is_dir(),
            Self::File => path.is_file(),
        }
    }
}

/// One row of the declarative dependency table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Display name, unique within the table
    pub name: String,
    /// Path relative to the dependency root
    pub relative_path: PathBuf,
    /// Expected entry kind
    pub kind: DependencyKind,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, relative_path: impl Into<PathBuf>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            kind,
        }
    }

    /// Table rows contributed by one component, in declaration order:
    /// includes, libs (if any), runtime (if any)
    pub fn from_component(component: &ComponentConfig) -> Vec<Self> {
        let mut specs = Vec::with_capacity(3);

        let include = match &component.include {
            Some(include) => component.dir.join(include),
            None => component.dir.clone(),
        };
        specs.push(Self::new(
            format!("{} includes", component.name),
            include,
            DependencyKind::Directory,
        ));

        if let Some(lib) = &component.lib {
            specs.push(Self::new(
                format!("{} libs", component.name),
                component.dir.join(lib),
                DependencyKind::Directory,
            ));
        }

        if let Some(runtime) = &component.runtime {
            specs.push(Self::new(
                format!("{} runtime", component.name),
                component.dir.join(runtime),
                DependencyKind::File,
            ));
        }

        specs
    }
}

/// A dependency with its path resolved against the dependency root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyItem {
    pub name: String,
    pub resolved_path: PathBuf,
    pub kind: DependencyKind,
}

impl DependencyItem {
    /// Check the filesystem for this item
    pub fn exists(&self) -> bool {
        self.kind.is_satisfied_by(&self.resolved_path)
    }
}

/// Ordered set of resolved dependencies
///
/// Iteration order is the declaration order of the table it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    items: Vec<DependencyItem>,
}

impl DependencySet {
    /// Resolve every row of `table` against `root`
    ///
    /// Pure path arithmetic: nothing is read from disk and nothing can fail.
    /// A later row with an already used name replaces the earlier one in place.
    pub fn locate(root: &Path, table: &[DependencySpec]) -> Self {
        let mut set = Self::default();
        for spec in table {
            let item = DependencyItem {
                name: spec.name.clone(),
                resolved_path: root.join(&spec.relative_path),
                kind: spec.kind,
            };
            match set.items.iter_mut().find(|existing| existing.name == item.name) {
                Some(existing) => *existing = item,
                None => set.items.push(item),
            }
        }
        set
    }

    /// Look up an item by name
    pub fn get(&self, name: &str) -> Option<&DependencyItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of checking a dependency set against the filesystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Names of items that were found, in declaration order
    pub found: Vec<String>,
    /// Names of items that were missing, in declaration order
    pub missing: Vec<String>,
}

impl VerificationResult {
    /// True when nothing is missing
    pub fn ok(&self) -> bool {
        self.missing.is_empty()
    }

    /// The gating error for a failed verification
    pub fn error(&self) -> Option<BuildError> {
        if self.ok() {
            None
        } else {
            Some(BuildError::DependencyVerificationFailed {
                missing: self.missing.clone(),
            })
        }
    }
}

/// Check every item of `set`, reporting one status line per item
///
/// A missing item is an expected outcome and is only recorded; all items are
/// checked even after the first miss.
pub fn verify(set: &DependencySet, reporter: &mut dyn Reporter) -> VerificationResult {
    reporter.report(Event::Stage("Verifying dependencies..."));

    let mut result = VerificationResult::default();
    for item in set.iter() {
        if item.exists() {
            log::debug!("found {} at {}", item.name, item.resolved_path.display());
            reporter.report(Event::DependencyFound { item });
            result.found.push(item.name.clone());
        } else {
            log::debug!(
                "{}",
                BuildError::MissingDependency {
                    name: item.name.clone(),
                    path: item.resolved_path.clone(),
                }
            );
            reporter.report(Event::DependencyMissing { item });
            result.missing.push(item.name.clone());
        }
    }

    if !result.ok() {
        reporter.report(Event::VerificationFailed {
            missing: result.missing.len(),
        });
    }

    result
}
