//! Build command - verify dependencies, deploy runtime libraries, compile

use anyhow::{Context, Result};
use std::path::PathBuf;
use trailhead_build::{BuildReport, Builder, OutputMode};

/// Build command arguments
#[derive(Default)]
pub struct BuildArgs {
    /// Project directory
    pub project_dir: PathBuf,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Remove known artifacts first (rebuild)
    pub clean: bool,
    /// Show compiler command lines
    pub verbose: bool,
    /// Print the build report as JSON instead of status lines
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
}

/// Run the build command, returning whether the build succeeded
pub fn run(args: BuildArgs) -> Result<bool> {
    let output_mode = determine_output_mode(&args);

    let builder = Builder::for_project(&args.project_dir, args.config_path.as_deref())
        .context("Failed to load project configuration")?
        .with_verbose(output_mode.is_verbose());

    let mut reporter = output_mode.reporter(args.no_color);
    let report = if args.clean {
        builder.rebuild(reporter.as_mut())
    } else {
        builder.build(reporter.as_mut())
    };

    if let Some(err) = report.error() {
        log::debug!("{}", err);
    }

    if output_mode == OutputMode::Json {
        println!("{}", render_json(&report)?);
    }

    Ok(report.success())
}

/// Determine output mode from arguments
fn determine_output_mode(args: &BuildArgs) -> OutputMode {
    if args.json {
        OutputMode::Json
    } else if args.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    }
}

fn render_json(report: &BuildReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize build report")
}
