//! Runtime library deployment
//!
//! Executables load their shared libraries from their own directory, so the
//! runtime binaries of each component are copied into the project root.
//! Deployment is advisory: every item is attempted and failures only mark the
//! report.

use crate::error::BuildError;
use crate::output::{Event, Reporter};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// A runtime library to copy next to the executables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentItem {
    /// Library inside the dependency tree
    pub source_path: PathBuf,
    /// File name in the destination directory
    pub dest_filename: String,
}

impl DeploymentItem {
    pub fn new(source_path: impl Into<PathBuf>, dest_filename: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            dest_filename: dest_filename.into(),
        }
    }

    /// Destination path inside `dest_dir`
    pub fn destination(&self, dest_dir: &Path) -> PathBuf {
        dest_dir.join(&self.dest_filename)
    }
}

/// What happened to one deployment item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeploymentStatus {
    Copied { bytes: u64 },
    SourceMissing,
    Failed { error: String },
}

/// Per-item deployment results, in item order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    pub items: Vec<(String, DeploymentStatus)>,
}

impl DeploymentReport {
    /// False when any copy failed; missing sources do not count
    pub fn ok(&self) -> bool {
        !self
            .items
            .iter()
            .any(|(_, status)| matches!(status, DeploymentStatus::Failed { .. }))
    }

    pub fn copied(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, status)| matches!(status, DeploymentStatus::Copied { .. }))
            .count()
    }
}

/// Copy every item into `dest_dir`, overwriting existing files
pub fn deploy(items: &[DeploymentItem], dest_dir: &Path, reporter: &mut dyn Reporter) -> DeploymentReport {
    reporter.report(Event::Stage("Deploying runtime libraries..."));

    let mut report = DeploymentReport::default();
    for item in items {
        let status = deploy_one(item, dest_dir, reporter);
        report.items.push((item.dest_filename.clone(), status));
    }
    report
}

fn deploy_one(item: &DeploymentItem, dest_dir: &Path, reporter: &mut dyn Reporter) -> DeploymentStatus {
    if !item.source_path.is_file() {
        log::warn!("runtime library not found: {}", item.source_path.display());
        reporter.report(Event::RuntimeSourceMissing {
            path: &item.source_path,
        });
        return DeploymentStatus::SourceMissing;
    }

    let dest = item.destination(dest_dir);
    match copy_preserving_metadata(&item.source_path, &dest) {
        Ok(bytes) => {
            log::debug!("copied {} -> {}", item.source_path.display(), dest.display());
            reporter.report(Event::RuntimeCopied {
                name: &item.dest_filename,
            });
            DeploymentStatus::Copied { bytes }
        }
        Err(e) => {
            log::error!("{}", BuildError::deployment(&item.dest_filename, &e));
            let error = e.to_string();
            reporter.report(Event::RuntimeCopyFailed {
                name: &item.dest_filename,
                error: &error,
            });
            DeploymentStatus::Failed { error }
        }
    }
}

/// Copy contents and permissions, then carry over the modification time
fn copy_preserving_metadata(source: &Path, dest: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, dest)?;

    let modified = fs::metadata(source).and_then(|meta| meta.modified());
    let preserved = modified.and_then(|time| {
        File::options()
            .write(true)
            .open(dest)
            .and_then(|file| file.set_modified(time))
    });
    if let Err(e) = preserved {
        log::warn!(
            "copied {} but could not preserve its modification time: {}",
            dest.display(),
            e
        );
    }

    Ok(bytes)
}
