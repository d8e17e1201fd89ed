/// Process Executor - Bounded Native Process Runs
///
/// **Responsibility:**
/// Spawn one program, capture both output streams, and wait for it with a
/// hard wall-clock bound.
///
/// **Guarantees:**
/// - stdin is `/dev/null`, so a program blocked on input sees EOF
/// - the child leads its own process group; on timeout or cancellation the
///   whole group gets SIGKILL, unconditionally
/// - the group is only signalled while the leader is still unreaped, so its
///   pid cannot have been handed to another process
/// - each stream keeps its last `output_limit` bytes; the driver's sentinel
///   is printed last, so the tail is the part that matters
/// - stream collection after exit is bounded by `KILL_GRACE`
///
/// The executor never interprets what it captured. Exit codes, signals and
/// bytes go back to the caller as-is; decoding is the adapter's job.
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitid, Id, WaitPidFlag};
use nix::unistd::Pid;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Per-stream capture limit; older output is dropped first.
pub const MAX_OUTPUT_BYTES: u64 = 1024 * 1024;

/// How long to wait for a killed process and its pipes to wind down.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Environment variables stripped from the inherited environment.
    pub env_remove: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }
}

/// Raw result of a process that ran to completion.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("process timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("process run cancelled")]
    Cancelled,
    #[error("failed to wait for process: {0}")]
    Wait(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    output_limit: u64,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self {
            output_limit: MAX_OUTPUT_BYTES,
        }
    }
}

enum Termination {
    Exited,
    TimedOut,
    Cancelled,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_limit(output_limit: u64) -> Self {
        Self { output_limit }
    }

    /// Run `spec` to completion, or kill it once `timeout` elapses or
    /// `cancel` fires.
    pub async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, ExecError> {
        if cancel.is_cancelled() {
            return Err(ExecError::Cancelled);
        }

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);
        for key in &spec.env_remove {
            command.env_remove(key);
        }

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        let Some(pid) = child.id().map(|id| Pid::from_raw(id as i32)) else {
            return Err(ExecError::Wait(std::io::Error::other("child reaped before it was tracked")));
        };

        let stdout_task = child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(capture(pipe, self.output_limit)));
        let stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(capture(pipe, self.output_limit)));

        let mut exited = tokio::task::spawn_blocking(move || wait_unreaped(pid));
        let termination = tokio::select! {
            waited = &mut exited => {
                if let Ok(Err(e)) = waited {
                    warn!(program = %spec.program, pid = %pid, error = %e, "waitid failed");
                }
                Termination::Exited
            }
            _ = tokio::time::sleep(timeout) => Termination::TimedOut,
            _ = cancel.cancelled() => Termination::Cancelled,
        };
        let elapsed = start.elapsed();

        // The leader is a zombie or still running, so `pid` is still our
        // group. This also kills stragglers that may hold our pipes.
        kill_group(pid);
        if !matches!(termination, Termination::Exited) {
            if let Err(e) = child.start_kill() {
                debug!(program = %spec.program, error = %e, "Kill after group kill failed");
            }
        }
        let reaped = tokio::time::timeout(KILL_GRACE, child.wait()).await;

        let stdout = collect(stdout_task).await;
        let stderr = collect(stderr_task).await;

        match termination {
            Termination::Exited => {
                let status = match reaped {
                    Ok(Ok(status)) => status,
                    Ok(Err(e)) => return Err(ExecError::Wait(e)),
                    Err(_) => {
                        return Err(ExecError::Wait(std::io::Error::new(
                            std::io::ErrorKind::TimedOut,
                            "exited process could not be reaped",
                        )))
                    }
                };
                debug!(
                    program = %spec.program,
                    exit_code = ?status.code(),
                    signal = ?status.signal(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Process exited"
                );
                Ok(ProcessOutput {
                    exit_code: status.code(),
                    signal: status.signal(),
                    stdout,
                    stderr,
                    elapsed,
                })
            }
            Termination::TimedOut => {
                if reaped.is_err() {
                    warn!(program = %spec.program, pid = %pid, "Process did not exit after SIGKILL");
                }
                warn!(
                    program = %spec.program,
                    timeout_ms = timeout.as_millis() as u64,
                    "Process timed out - killed"
                );
                Err(ExecError::Timeout(timeout))
            }
            Termination::Cancelled => {
                if reaped.is_err() {
                    warn!(program = %spec.program, pid = %pid, "Process did not exit after SIGKILL");
                }
                debug!(program = %spec.program, "Process cancelled - killed");
                Err(ExecError::Cancelled)
            }
        }
    }
}

/// Block until `pid` has exited without reaping it.
///
/// The zombie keeps the pid (and with it the process group id) reserved
/// until `Child::wait` collects it.
fn wait_unreaped(pid: Pid) -> nix::Result<()> {
    loop {
        match waitid(Id::Pid(pid), WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT) {
            Err(Errno::EINTR) => continue,
            other => return other.map(|_| ()),
        }
    }
}

fn kill_group(pid: Pid) {
    // ESRCH just means the group is already gone.
    let _ = killpg(pid, Signal::SIGKILL);
}

/// Read `reader` to EOF, keeping only the last `limit` bytes.
async fn capture<R>(mut reader: R, limit: u64) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let mut tail = Vec::new();
    let mut chunk = vec![0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        tail.extend_from_slice(&chunk[..n]);
        // Trim in batches so a chatty program is not quadratic.
        if tail.len() > limit.saturating_mul(2) {
            tail.drain(..tail.len() - limit);
        }
    }
    if tail.len() > limit {
        tail.drain(..tail.len() - limit);
    }
    Ok(tail)
}

async fn collect(task: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> String {
    let Some(mut task) = task else {
        return String::new();
    };
    match tokio::time::timeout(KILL_GRACE, &mut task).await {
        Ok(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Ok(Err(e))) => {
            warn!(error = %e, "Failed to read process output");
            String::new()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Output reader task failed");
            String::new()
        }
        Err(_) => {
            task.abort();
            warn!("Output stream still open after grace period - abandoned");
            String::new()
        }
    }
}
