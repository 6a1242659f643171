//! Build progress reporting
//!
//! The orchestrator describes what it is doing as a stream of [`Event`]s and
//! hands them to a [`Reporter`]. Every event renders to the plain status line
//! users see; reporters decide where that line goes.

use crate::dependency::DependencyItem;
use crate::driver::{CompileOutcome, CompileStatus};
use crate::targets::{format_megabytes, CompileTarget};
use colored::*;
use std::fmt;
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Something worth telling the user about
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Title banner at the start of a build
    Banner(&'a str),
    /// A pipeline stage begins
    Stage(&'a str),
    DependencyFound {
        item: &'a DependencyItem,
    },
    DependencyMissing {
        item: &'a DependencyItem,
    },
    VerificationFailed {
        missing: usize,
    },
    RuntimeCopied {
        name: &'a str,
    },
    RuntimeSourceMissing {
        path: &'a Path,
    },
    RuntimeCopyFailed {
        name: &'a str,
        error: &'a str,
    },
    /// Deployment had failures but the build carries on
    DeploymentDegraded,
    CompileStarted {
        target: &'a CompileTarget,
    },
    /// Full compiler command line (verbose builds only)
    CommandLine(&'a str),
    CompileFinished {
        outcome: &'a CompileOutcome,
    },
    BuildSucceeded {
        targets: &'a [CompileTarget],
    },
    BuildFailed {
        failed: usize,
        total: usize,
    },
    ArtifactRemoved {
        path: &'a Path,
    },
    ArtifactRemoveFailed {
        path: &'a Path,
        error: &'a str,
    },
    CleanComplete,
}

/// How an event should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Detail,
}

impl Event<'_> {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Banner(_) | Self::Stage(_) | Self::CompileStarted { .. } => Severity::Info,
            Self::DependencyFound { .. }
            | Self::RuntimeCopied { .. }
            | Self::ArtifactRemoved { .. }
            | Self::BuildSucceeded { .. }
            | Self::CleanComplete => Severity::Success,
            Self::DependencyMissing { .. }
            | Self::RuntimeSourceMissing { .. }
            | Self::RuntimeCopyFailed { .. }
            | Self::DeploymentDegraded
            | Self::ArtifactRemoveFailed { .. } => Severity::Warning,
            Self::VerificationFailed { .. } | Self::BuildFailed { .. } => Severity::Error,
            Self::CompileFinished { outcome } => {
                if outcome.succeeded() {
                    Severity::Success
                } else {
                    Severity::Error
                }
            }
            Self::CommandLine(_) => Severity::Detail,
        }
    }

    /// Whether a blank line should precede this event on a terminal
    fn opens_section(&self) -> bool {
        matches!(
            self,
            Self::Banner(_) | Self::Stage(_) | Self::CompileStarted { .. } | Self::BuildSucceeded { .. }
        )
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banner(title) => {
                let rule = "=".repeat(RULE_WIDTH);
                write!(f, "{}\n {}\n{}", rule, title, rule)
            }
            Self::Stage(message) => write!(f, "[*] {}", message),
            Self::DependencyFound { item } => write!(f, "  [OK] Found: {}", item.name),
            Self::DependencyMissing { item } => write!(
                f,
                "  [!] Missing: {} at {}",
                item.name,
                item.resolved_path.display()
            ),
            Self::VerificationFailed { missing } => {
                write!(f, "[ERROR] Missing {} dependencies!", missing)
            }
            Self::RuntimeCopied { name } => write!(f, "  [✓] Copied {}", name),
            Self::RuntimeSourceMissing { path } => {
                write!(f, "  [!] Runtime library not found: {}", path.display())
            }
            Self::RuntimeCopyFailed { name, error } => {
                write!(f, "  [!] Failed to copy {}: {}", name, error)
            }
            Self::DeploymentDegraded => write!(
                f,
                "[WARNING] Runtime library deployment had issues, continuing anyway..."
            ),
            Self::CompileStarted { target } => write!(f, "[*] Compiling {}...", target),
            Self::CommandLine(command) => write!(f, "[DEBUG] Command: {}", command),
            Self::CompileFinished { outcome } => fmt_outcome(f, outcome),
            Self::BuildSucceeded { targets } => {
                let rule = "=".repeat(RULE_WIDTH);
                write!(f, "{}\n BUILD SUCCESSFUL!\n{}\n\nRun executables:", rule, rule)?;
                for target in targets.iter() {
                    let output = target.output.display().to_string();
                    match &target.description {
                        Some(description) => write!(f, "\n  > {:<18} ({})", output, description)?,
                        None => write!(f, "\n  > {}", output)?,
                    }
                }
                Ok(())
            }
            Self::BuildFailed { failed, total } => write!(
                f,
                "[ERROR] Build failed: {} of {} targets did not compile",
                failed, total
            ),
            Self::ArtifactRemoved { path } => write!(f, "  [✓] Removed {}", path.display()),
            Self::ArtifactRemoveFailed { path, error } => {
                write!(f, "  [!] Failed to remove {}: {}", path.display(), error)
            }
            Self::CleanComplete => write!(f, "[✓] Clean complete"),
        }
    }
}

fn fmt_outcome(f: &mut fmt::Formatter<'_>, outcome: &CompileOutcome) -> fmt::Result {
    match &outcome.status {
        CompileStatus::Succeeded => write!(
            f,
            "[✓] Created: {} ({})",
            outcome.target.output.display(),
            format_megabytes(outcome.artifact_size_bytes.unwrap_or(0))
        ),
        CompileStatus::NonZeroExit { .. } => {
            write!(f, "[ERROR] Compilation failed!")?;
            // stderr carries the compiler diagnostics, so it goes first
            if !outcome.stderr.is_empty() {
                write!(f, "\nSTDERR:\n{}", outcome.stderr)?;
            }
            if !outcome.stdout.is_empty() {
                write!(f, "\nSTDOUT:\n{}", outcome.stdout)?;
            }
            Ok(())
        }
        CompileStatus::Timeout { timeout } => write!(
            f,
            "[ERROR] Compilation timeout! (no result after {}s)",
            timeout.as_secs()
        ),
        CompileStatus::ProcessError { message } => {
            write!(f, "[ERROR] Compilation error: {}", message)
        }
        CompileStatus::ArtifactNotProduced => write!(
            f,
            "[ERROR] Output file not created: {}",
            outcome.target.output.display()
        ),
    }
}

/// Receives build events
pub trait Reporter {
    fn report(&mut self, event: Event<'_>);
}

/// Output mode for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Status lines
    #[default]
    Normal,
    /// Status lines plus compiler command lines
    Verbose,
    /// No status lines; the caller prints a JSON report
    Json,
}

impl OutputMode {
    pub fn is_verbose(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Reporter matching this mode
    pub fn reporter(&self, no_color: bool) -> Box<dyn Reporter> {
        match self {
            Self::Normal | Self::Verbose => Box::new(ConsoleReporter::new().with_no_color(no_color)),
            Self::Json => Box::new(QuietReporter),
        }
    }
}

/// Prints status lines to stdout, colorizing the status marker
pub struct ConsoleReporter {
    /// Disable colored output
    no_color: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { no_color: false }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    fn paint(&self, severity: Severity, line: &str) -> String {
        if self.no_color {
            return line.to_string();
        }
        match severity {
            Severity::Info => line.bold().to_string(),
            Severity::Success => line.green().to_string(),
            Severity::Warning => line.yellow().to_string(),
            Severity::Error => line.red().bold().to_string(),
            Severity::Detail => line.dimmed().to_string(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: Event<'_>) {
        if event.opens_section() {
            println!();
        }

        let text = event.to_string();
        // Only the headline is painted. Anything below it (captured compiler
        // output, run hints) is printed verbatim.
        match text.split_once('\n') {
            Some((head, rest)) if matches!(event, Event::CompileFinished { .. }) => {
                println!("{}", self.paint(event.severity(), head));
                println!("{}", rest);
            }
            _ => println!("{}", self.paint(event.severity(), &text)),
        }
    }
}

/// Discards status lines, keeping them available at debug log level
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn report(&mut self, event: Event<'_>) {
        log::debug!("{}", event);
    }
}

/// Keeps every rendered status line in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Vec<String>,
}

impl RecordingReporter {
    /// Rendered events, in the order they were reported
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any rendered event contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Index of the first rendered event containing `needle`
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: Event<'_>) {
        self.lines.push(event.to_string());
    }
}
