//! Subprocess execution with concurrently drained output streams.
//!
//! Every external tool (gbak, gfix, 7z, npm) goes through [`run_logged`]. Stdout and
//! stderr are read line by line in parallel and logged as they arrive; both readers are
//! joined together with the child's exit before the call returns.
//!
//! Tools are often wrappers (`npm` starts a shell that starts `node`), so killing
//! the direct child is not enough. Each child leads its own process group on unix
//! and the whole tree is killed on timeout or when the owning task is aborted.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::metrics;

/// Number of trailing stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Errors raised while launching or waiting on a subprocess.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be found.
    #[error("{tool} not found at path: {program}")]
    NotFound { tool: String, program: PathBuf },

    /// The program exceeded its time budget and was killed.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: String, timeout_secs: u64 },

    /// Any other I/O failure while spawning or waiting.
    #[error("{tool} I/O error: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Result of a finished subprocess.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// Last lines written to stderr, oldest first.
    pub stderr_tail: Vec<String>,
    pub stdout_lines: usize,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, or `None` when the process was terminated by a signal.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Stderr tail joined into a single string, `None` if empty.
    pub fn stderr_summary(&self) -> Option<String> {
        if self.stderr_tail.is_empty() {
            None
        } else {
            Some(self.stderr_tail.join("\n"))
        }
    }
}

/// Runs `command` to completion, logging each output line under `tool`.
///
/// The child is killed if it does not exit within `limit`.
pub async fn run_logged(
    tool: &str,
    mut command: Command,
    limit: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let start = Instant::now();
    let program = PathBuf::from(command.as_std().get_program());

    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            metrics::TOOL_INVOCATIONS
                .with_label_values(&[tool, "error"])
                .inc();
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessError::NotFound {
                    tool: tool.to_string(),
                    program: program.clone(),
                }
            } else {
                ProcessError::Io {
                    tool: tool.to_string(),
                    source: e,
                }
            }
        })?;

    // Declared after `child` so it drops first, while the tree is still intact.
    let mut tree = TreeKillGuard::new(tool, child.id());

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let result = timeout(limit, async {
        let ((stdout_lines, _), (_, stderr_tail), status) = tokio::join!(
            drain(tool, OutputStream::Stdout, stdout),
            drain(tool, OutputStream::Stderr, stderr),
            child.wait(),
        );
        status.map(|status| (status, stdout_lines, stderr_tail))
    })
    .await;

    let outcome = match result {
        Ok(Ok((status, stdout_lines, stderr_tail))) => {
            tree.disarm();
            Ok(ProcessOutput {
                status,
                stderr_tail: stderr_tail.into(),
                stdout_lines,
                elapsed: start.elapsed(),
            })
        }
        Ok(Err(e)) => {
            tree.kill();
            Err(ProcessError::Io {
                tool: tool.to_string(),
                source: e,
            })
        }
        Err(_) => {
            tree.kill();
            let _ = child.kill().await;
            Err(ProcessError::Timeout {
                tool: tool.to_string(),
                timeout_secs: limit.as_secs(),
            })
        }
    };

    let label = match &outcome {
        Ok(output) if output.success() => "success",
        Ok(_) => "failed",
        Err(ProcessError::Timeout { .. }) => "timeout",
        Err(_) => "error",
    };
    metrics::TOOL_INVOCATIONS
        .with_label_values(&[tool, label])
        .inc();

    outcome
}

/// Kills a child's process tree when dropped while armed.
///
/// Dropping happens when the task running [`run_logged`] is aborted, which is how
/// the scheduler abandons a run that does not stop in time.
struct TreeKillGuard {
    tool: String,
    pid: Option<u32>,
}

impl TreeKillGuard {
    fn new(tool: &str, pid: Option<u32>) -> Self {
        Self {
            tool: tool.to_string(),
            pid,
        }
    }

    /// The child exited on its own; leave the group alone.
    fn disarm(&mut self) {
        self.pid = None;
    }

    fn kill(&mut self) {
        if let Some(pid) = self.pid.take() {
            kill_process_tree(&self.tool, pid);
        }
    }
}

impl Drop for TreeKillGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_tree(tool: &str, pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) => warn!(tool, pid, "Killed process group"),
        // Every member already exited
        Err(Errno::ESRCH) => {}
        Err(e) => warn!(tool, pid, "Failed to kill process group: {}", e),
    }
}

#[cfg(windows)]
fn kill_process_tree(tool: &str, pid: u32) {
    let result = std::process::Command::new("taskkill")
        .args(["/T", "/F", "/PID"])
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(status) if status.success() => warn!(tool, pid, "Killed process tree"),
        Ok(status) => warn!(tool, pid, "taskkill exited with {}", status),
        Err(e) => warn!(tool, pid, "Failed to run taskkill: {}", e),
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_process_tree(_tool: &str, _pid: u32) {}

/// Reads a stream to EOF, logging every line.
///
/// Lines are decoded lossily since database tools emit Latin-1 on some platforms.
/// Returns the line count and the stderr tail (empty for stdout).
async fn drain<R>(
    tool: &str,
    stream: OutputStream,
    reader: Option<R>,
) -> (usize, VecDeque<String>)
where
    R: AsyncRead + Unpin,
{
    let mut count = 0;
    let mut tail = VecDeque::new();
    let Some(reader) = reader else {
        return (count, tail);
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                count += 1;
                match stream {
                    OutputStream::Stdout => info!(tool, stream = stream.as_str(), "{}", line),
                    OutputStream::Stderr => {
                        warn!(tool, stream = stream.as_str(), "{}", line);
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line.to_string());
                    }
                }
            }
            Err(e) => {
                warn!(tool, stream = stream.as_str(), "Failed to read output: {}", e);
                break;
            }
        }
    }
    (count, tail)
}
