use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod logging;

/// Build orchestrator for the Hiking Simulator.
///
/// Verifies the pre-built SDL2, GLEW and GLM trees, copies their runtime
/// libraries next to the executables, and compiles every target with the
/// configured C++ compiler. Settings come from trailhead.toml in the project
/// directory; without one the built-in project layout is used.
///
/// EXAMPLES:
///     trailhead                    Build every target
///     trailhead build -v           Build and show compiler command lines
///     trailhead check              Only verify dependencies
///     trailhead rebuild --json     Clean, build, print a JSON report
///
/// ENVIRONMENT VARIABLES:
///     TRAILHEAD_CXX          Compiler executable
///     TRAILHEAD_TIMEOUT      Per-target compile timeout in seconds
///     TRAILHEAD_DEPS_DIR     Dependency root
///     TRAILHEAD_DIAGNOSTICS  Set to 'json' for JSON build reports by default
///     NO_COLOR               Set to disable colored output
///     RUST_LOG               Log filter (default: info, debug with --verbose)
#[derive(Parser)]
#[command(name = "trailhead")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (compiler working directory and artifact destination)
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Configuration file (default: <project-dir>/trailhead.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify dependencies, deploy runtime libraries and compile all targets
    ///
    /// This is the default when no command is given.
    #[command(visible_alias = "b")]
    Build {
        /// Show compiler command lines and debug logs
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove executables and deployed runtime libraries
    Clean,

    /// Clean, then build
    Rebuild {
        /// Show compiler command lines and debug logs
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify dependencies without building
    #[command(visible_alias = "c")]
    Check,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let env = config::Config::from_env();

    let command = cli.command.unwrap_or(Commands::Build {
        verbose: false,
        json: false,
    });

    let verbose = matches!(
        command,
        Commands::Build { verbose: true, .. } | Commands::Rebuild { verbose: true, .. }
    );
    logging::init(verbose);

    let succeeded = match command {
        Commands::Build { verbose, json } | Commands::Rebuild { verbose, json } => {
            let clean = matches!(command, Commands::Rebuild { .. });
            commands::build::run(commands::build::BuildArgs {
                project_dir: cli.project_dir,
                config_path: cli.config,
                clean,
                verbose,
                json: json || env.default_json,
                no_color: env.no_color,
            })?
        }
        Commands::Clean => {
            commands::clean::run(commands::clean::CleanArgs {
                project_dir: cli.project_dir,
                config_path: cli.config,
                no_color: env.no_color,
            })?;
            true
        }
        Commands::Check => commands::check::run(commands::check::CheckArgs {
            project_dir: cli.project_dir,
            config_path: cli.config,
            no_color: env.no_color,
        })?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_build() {
        let cli = Cli::parse_from(["trailhead"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.project_dir, PathBuf::from("."));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from(["trailhead", "build", "-v", "--json"]);
        match cli.command {
            Some(Commands::Build { verbose, json }) => assert!(verbose && json),
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "trailhead",
            "rebuild",
            "--project-dir",
            "/games/hiking",
            "--config",
            "ci.toml",
        ]);
        assert!(matches!(cli.command, Some(Commands::Rebuild { .. })));
        assert_eq!(cli.project_dir, PathBuf::from("/games/hiking"));
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
    }

    #[test]
    fn test_alias_c_for_check() {
        let cli = Cli::parse_from(["trailhead", "c"]);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn test_clean_takes_no_flags() {
        assert!(Cli::try_parse_from(["trailhead", "clean", "--verbose"]).is_err());
    }
}
