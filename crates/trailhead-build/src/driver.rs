//! Compiler process execution
//!
//! Runs one compiler invocation with a deadline, captures stdout and stderr
//! separately, and decides whether the target actually succeeded. A zero exit
//! status is not enough on its own: the expected artifact has to be on disk
//! afterwards.

use crate::error::BuildError;
use crate::invocation::CompileInvocation;
use crate::targets::CompileTarget;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Default per-target compile timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long captured output may stay open after the compiler exits
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Final state of one compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileStatus {
    /// Exit status zero and the artifact exists
    Succeeded,
    /// The compiler was killed after running past the timeout
    Timeout { timeout: Duration },
    /// The compiler could not be started or waited on
    ProcessError { message: String },
    /// The compiler reported failure; `None` means killed by a signal
    NonZeroExit { code: Option<i32> },
    /// Exit status zero but no artifact
    ArtifactNotProduced,
}

impl CompileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Timeout { .. } => "timeout",
            Self::ProcessError { .. } => "process-error",
            Self::NonZeroExit { .. } => "failed",
            Self::ArtifactNotProduced => "artifact-missing",
        }
    }
}

/// Result of compiling one target
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutcome {
    pub target: CompileTarget,
    pub status: CompileStatus,
    pub stdout: String,
    pub stderr: String,
    /// Size of the produced executable, on success
    pub artifact_size_bytes: Option<u64>,
    pub duration: Duration,
}

impl CompileOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, CompileStatus::Succeeded)
    }

    /// Classified failure, if any
    pub fn error(&self) -> Option<BuildError> {
        let target = self.target.label();
        match &self.status {
            CompileStatus::Succeeded => None,
            CompileStatus::Timeout { timeout } => Some(BuildError::CompileTimeout {
                target,
                timeout: *timeout,
            }),
            CompileStatus::ProcessError { message } => Some(BuildError::CompileProcessError {
                target,
                error: message.clone(),
            }),
            CompileStatus::NonZeroExit { code } => {
                Some(BuildError::CompileNonZeroExit { target, code: *code })
            }
            CompileStatus::ArtifactNotProduced => Some(BuildError::ArtifactNotProduced {
                target,
                path: self.target.output.clone(),
            }),
        }
    }
}

/// Runs compiler invocations in the project root
#[derive(Debug, Clone)]
pub struct CompilationDriver {
    /// Working directory of the compiler; artifacts are resolved against it
    working_dir: PathBuf,
    timeout: Duration,
}

impl CompilationDriver {
    /// Create a driver for the given project root
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-invocation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `invocation` to completion or until the timeout expires
    ///
    /// Never panics and never leaves the child running: every failure is
    /// folded into the returned outcome.
    pub fn run(&self, invocation: &CompileInvocation, target: &CompileTarget) -> CompileOutcome {
        let start = Instant::now();

        let mut command = invocation.to_command();
        command
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        own_process_group(&mut command);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                log::debug!("failed to spawn {}: {}", invocation.executable(), e);
                return outcome(
                    target,
                    CompileStatus::ProcessError {
                        message: e.to_string(),
                    },
                    String::new(),
                    String::new(),
                    start,
                );
            }
        };
        log::debug!("spawned {} (pid {})", invocation.executable(), child.id());

        let stdout = Capture::start(child.stdout.take());
        let stderr = Capture::start(child.stderr.take());

        let waited = wait_with_timeout(&mut child, self.timeout);
        if waited.is_err() {
            terminate(&mut child);
            let _ = child.wait();
        }

        // Both pipes normally reach EOF once the child is gone. A background
        // descendant can keep them open, so only wait a short while.
        let drain_deadline = Instant::now() + DRAIN_GRACE;
        let stdout = stdout.finish(drain_deadline);
        let stderr = stderr.finish(drain_deadline);

        let status = match waited {
            Err(e) => CompileStatus::ProcessError {
                message: e.to_string(),
            },
            Ok(None) => {
                log::warn!(
                    "{} exceeded {}s and was killed",
                    target.label(),
                    self.timeout.as_secs()
                );
                CompileStatus::Timeout {
                    timeout: self.timeout,
                }
            }
            Ok(Some(exit)) if !exit.success() => CompileStatus::NonZeroExit { code: exit.code() },
            Ok(Some(_)) => {
                let artifact = target.artifact_path(&self.working_dir);
                match fs::metadata(&artifact) {
                    Ok(meta) if meta.is_file() && meta.len() > 0 => {
                        let mut result = outcome(target, CompileStatus::Succeeded, stdout, stderr, start);
                        result.artifact_size_bytes = Some(meta.len());
                        return result;
                    }
                    _ => {
                        log::debug!("compiler exited 0 but {} is missing", artifact.display());
                        CompileStatus::ArtifactNotProduced
                    }
                }
            }
        };

        outcome(target, status, stdout, stderr, start)
    }
}

fn outcome(
    target: &CompileTarget,
    status: CompileStatus,
    stdout: String,
    stderr: String,
    start: Instant,
) -> CompileOutcome {
    CompileOutcome {
        target: target.clone(),
        status,
        stdout,
        stderr,
        artifact_size_bytes: None,
        duration: start.elapsed(),
    }
}

/// One child pipe, drained on its own thread
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(stream: Option<R>) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let (done_tx, done) = mpsc::channel();

        thread::spawn(move || {
            if let Some(mut stream) = stream {
                let mut chunk = [0u8; 8192];
                loop {
                    match stream.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => match sink.lock() {
                            Ok(mut buffer) => buffer.extend_from_slice(&chunk[..n]),
                            Err(_) => break,
                        },
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
            }
            let _ = done_tx.send(());
        });

        Self { buffer, done }
    }

    /// Everything read so far, waiting for end of stream until `deadline`
    ///
    /// A reader still blocked at the deadline is left behind; it exits once
    /// whoever holds the pipe closes it.
    fn finish(self, deadline: Instant) -> String {
        let grace = deadline.saturating_duration_since(Instant::now());
        if let Err(mpsc::RecvTimeoutError::Timeout) = self.done.recv_timeout(grace) {
            log::warn!("compiler output still open after exit; keeping what was read so far");
        }

        let bytes = match self.buffer.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Wait for `child`, killing it once `timeout` has elapsed
///
/// Returns `Ok(None)` on timeout, after the child has been killed and reaped.
/// A timeout too large to represent as an `Instant` never expires.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    terminate(child);
                    child.wait()?;
                    return Ok(None);
                }
                POLL_INTERVAL.min(deadline - now)
            }
            None => POLL_INTERVAL,
        };
        thread::sleep(pause);
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kill the child together with anything it spawned
#[cfg(unix)]
fn terminate(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill(2) has no memory-safety preconditions. The child leads its
    // own process group (see `own_process_group`), so -pgid only reaches the
    // compiler and its descendants.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        log::debug!(
            "killing process group {} failed: {}",
            pgid,
            io::Error::last_os_error()
        );
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("killing pid {} failed: {}", child.id(), e);
    }
}
