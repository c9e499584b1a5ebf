//! Process-based runtime
//!
//! One fresh interpreter process per execution. The program is written to
//! the child's stdin, stdout/stderr are collected in full, and the whole
//! exchange is raced against the deadline. On expiry the child's process
//! group gets SIGTERM, then SIGKILL once the grace period is over.

use crate::config::InterpreterConfig;
use crate::execution::{ExecutionId, ExecutionPhase, ExecutionTracker};
use crate::limits::DEFAULT_GRACE_PERIOD;
use crate::types::ExecutionOutcome;
use async_trait::async_trait;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

/// Process-based runtime - pipes code into an interpreter's stdin
pub struct ProcessRuntime {
    interpreter: InterpreterConfig,
    grace_period: Duration,
}

impl ProcessRuntime {
    pub fn new(interpreter: InterpreterConfig) -> Self {
        Self {
            interpreter,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn interpreter(&self) -> &InterpreterConfig {
        &self.interpreter
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter.program);
        cmd.args(&self.interpreter.args)
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reclaims the child if the request task is dropped mid-flight
            .kill_on_drop(true);

        for name in &self.interpreter.passthrough_env {
            if let Some(value) = std::env::var_os(name) {
                cmd.env(name, value);
            }
        }
        cmd.envs(&self.interpreter.env);

        // Own process group, so signals reach anything the interpreter forks
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    /// SIGTERM the group, give it the grace period, then SIGKILL and reap
    async fn terminate(&self, id: ExecutionId, child: &mut Child, pid: Option<u32>) {
        if !signal_group(pid, Termination::Graceful) {
            // No group to signal; fall back to killing the direct child
            let _ = child.start_kill();
        }

        let exited = matches!(
            tokio::time::timeout(self.grace_period, child.wait()).await,
            Ok(Ok(_))
        );

        // Sweep group members that outlived the leader or trapped SIGTERM
        signal_group(pid, Termination::Forceful);

        if exited {
            tracing::debug!(execution_id = %id, "Process exited after SIGTERM");
        } else {
            tracing::warn!(
                execution_id = %id,
                grace_ms = self.grace_period.as_millis() as u64,
                "Process ignored SIGTERM, killing"
            );
            if let Err(e) = child.kill().await {
                tracing::error!(execution_id = %id, error = %e, "Failed to kill process");
            }
        }
    }
}

#[async_trait]
impl super::Runtime for ProcessRuntime {
    async fn run(&self, id: ExecutionId, code: &str, timeout: Duration) -> ExecutionOutcome {
        let mut tracker = ExecutionTracker::new(id);
        let timeout_ms = timeout.as_millis() as u64;

        let mut child = match self.command().spawn() {
            Ok(child) => child,
            Err(e) => {
                tracker.advance(ExecutionPhase::Resolved);
                tracing::warn!(
                    execution_id = %id,
                    program = %self.interpreter.program,
                    error = %e,
                    "Failed to spawn interpreter"
                );
                return ExecutionOutcome::Failed {
                    reason: e.to_string(),
                    elapsed_ms: tracker.elapsed_ms(),
                };
            }
        };
        let pid = child.id();
        tracker.advance(ExecutionPhase::Spawned);

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        tracker.advance(ExecutionPhase::Running);

        let completed =
            tokio::time::timeout(timeout, drive(&mut child, code, stdin, stdout, stderr)).await;

        let outcome = match completed {
            Ok((Ok(status), stdout, stderr)) => {
                tracker.advance(ExecutionPhase::Exited);
                resolve_exit(status, &stdout, &stderr, tracker.elapsed_ms())
            }
            Ok((Err(e), _, _)) => {
                tracing::error!(execution_id = %id, error = %e, "Failed to wait for process");
                tracker.advance(ExecutionPhase::Terminating);
                self.terminate(id, &mut child, pid).await;
                tracker.advance(ExecutionPhase::Exited);
                ExecutionOutcome::Failed {
                    reason: format!("Failed to wait for process: {}", e),
                    elapsed_ms: tracker.elapsed_ms(),
                }
            }
            Err(_) => {
                tracing::info!(execution_id = %id, timeout_ms, "Deadline exceeded, terminating");
                tracker.advance(ExecutionPhase::Terminating);
                self.terminate(id, &mut child, pid).await;
                tracker.advance(ExecutionPhase::Exited);
                ExecutionOutcome::TimedOut {
                    timeout_ms,
                    elapsed_ms: tracker.elapsed_ms(),
                }
            }
        };

        tracker.advance(ExecutionPhase::Resolved);
        outcome
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// Feed the program, drain both output pipes, then reap the child
async fn drive(
    child: &mut Child,
    code: &str,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
) -> (io::Result<ExitStatus>, Vec<u8>, Vec<u8>) {
    let ((), stdout, stderr) =
        tokio::join!(feed_stdin(stdin, code), read_stream(stdout), read_stream(stderr));
    let status = child.wait().await;
    (status, stdout, stderr)
}

/// Write the whole program, then close stdin so the interpreter starts
async fn feed_stdin(stdin: Option<ChildStdin>, code: &str) {
    let Some(mut stdin) = stdin else {
        return;
    };

    if let Err(e) = stdin.write_all(code.as_bytes()).await {
        // The interpreter exited before reading everything; its exit status
        // and stderr carry the diagnosis.
        tracing::debug!(error = %e, "Interpreter closed stdin early");
    }
    drop(stdin);
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "Output stream read failed");
        }
    }
    buf
}

fn resolve_exit(status: ExitStatus, stdout: &[u8], stderr: &[u8], elapsed_ms: u64) -> ExecutionOutcome {
    if status.success() {
        return ExecutionOutcome::Success {
            stdout: String::from_utf8_lossy(stdout).trim().to_string(),
            elapsed_ms,
        };
    }

    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    let reason = if stderr.is_empty() {
        describe_exit(status)
    } else {
        stderr
    };
    ExecutionOutcome::Failed { reason, elapsed_ms }
}

fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("Exit code {}", code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("Terminated by signal {}", signal);
        }
    }

    "Exit code unknown".to_string()
}

#[derive(Debug, Clone, Copy)]
enum Termination {
    Graceful,
    Forceful,
}

/// Signal the child's whole process group. Returns false if nothing was
/// signalled.
#[cfg(unix)]
fn signal_group(pid: Option<u32>, termination: Termination) -> bool {
    let Some(pid) = pid else {
        return false;
    };
    let signal = match termination {
        Termination::Graceful => libc::SIGTERM,
        Termination::Forceful => libc::SIGKILL,
    };

    // Negative pid addresses the process group led by the child
    let rc = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
    if rc == 0 {
        return true;
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() != Some(libc::ESRCH) {
        tracing::warn!(pid, signal, error = %err, "Failed to signal process group");
    }
    false
}

#[cfg(not(unix))]
fn signal_group(_pid: Option<u32>, _termination: Termination) -> bool {
    false
}
