//! Check command - verify dependencies without building

use anyhow::{Context, Result};
use std::path::PathBuf;
use trailhead_build::{Builder, ConsoleReporter};

/// Check command arguments
#[derive(Default)]
pub struct CheckArgs {
    pub project_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub no_color: bool,
}

/// Run the check command, returning whether every dependency was found
pub fn run(args: CheckArgs) -> Result<bool> {
    let builder = Builder::for_project(&args.project_dir, args.config_path.as_deref())
        .context("Failed to load project configuration")?;

    let mut reporter = ConsoleReporter::new().with_no_color(args.no_color);
    let result = builder.check(&mut reporter);

    if result.ok() {
        println!("All {} dependencies found", result.found.len());
    }
    Ok(result.ok())
}
