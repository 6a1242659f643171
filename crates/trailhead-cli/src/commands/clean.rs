//! Clean command - remove executables and deployed runtime libraries

use anyhow::{Context, Result};
use std::path::PathBuf;
use trailhead_build::{Builder, ConsoleReporter};

/// Clean command arguments
#[derive(Default)]
pub struct CleanArgs {
    pub project_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub no_color: bool,
}

/// Run the clean command
///
/// Items that cannot be removed are reported but do not fail the command.
pub fn run(args: CleanArgs) -> Result<()> {
    let builder = Builder::for_project(&args.project_dir, args.config_path.as_deref())
        .context("Failed to load project configuration")?;

    let mut reporter = ConsoleReporter::new().with_no_color(args.no_color);
    let report = builder.clean(&mut reporter);

    log::debug!(
        "clean: {} removed, {} failed",
        report.removed(),
        report.failures()
    );
    Ok(())
}
