//! Command execution abstraction for package-manager queries.
//!
//! This module provides the [`CommandRunner`] trait and the production
//! [`SystemCommandRunner`], keeping process spawning behind a seam so the
//! parsing and classification stages can be tested with scripted output.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What: Deadline and cancellation signal shared by every command of one check.
///
/// Details:
/// - Cloning is cheap; clones observe the same cancellation token.
/// - Reaching the deadline or cancelling the token terminates running children.
#[derive(Clone, Debug)]
pub struct CheckContext {
    /// Point in time after which running commands are killed.
    deadline: Instant,
    /// External cancellation, e.g. SIGINT in the CLI.
    cancel: CancellationToken,
}

impl CheckContext {
    /// Context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Instant::now() + timeout, CancellationToken::new())
    }

    /// Context with an explicit deadline and cancellation token.
    #[must_use]
    pub const fn new(deadline: Instant, cancel: CancellationToken) -> Self {
        Self { deadline, cancel }
    }

    /// Deadline for commands run under this context.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Token that cancels commands run under this context.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the context is already cancelled or past its deadline.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Resolves once the deadline passes or the token is cancelled.
    async fn interrupted(&self) -> Interrupt {
        tokio::select! {
            () = tokio::time::sleep_until(self.deadline) => Interrupt::TimedOut,
            () = self.cancel.cancelled() => Interrupt::Cancelled,
        }
    }
}

/// Why a running command was stopped early.
#[derive(Clone, Copy, Debug)]
enum Interrupt {
    TimedOut,
    Cancelled,
}

impl Interrupt {
    fn into_error(self, program: &str) -> CommandError {
        let program = program.to_string();
        match self {
            Self::TimedOut => CommandError::TimedOut { program },
            Self::Cancelled => CommandError::Cancelled { program },
        }
    }
}

/// Captured result of one finished command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output followed by standard error.
    pub output: Vec<u8>,
    /// Exit code; `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Build an output value, mostly useful for scripted runners in tests.
    pub fn new(output: impl Into<Vec<u8>>, exit_code: Option<i32>) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }

    /// Whether the process exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Whether the process wrote nothing at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Output decoded lossily with terminal escape sequences removed.
    #[must_use]
    pub fn text(&self) -> String {
        strip_ansi_escapes::strip_str(String::from_utf8_lossy(&self.output))
    }

    /// What: Apply the execution-failure rule to a finished command.
    ///
    /// Inputs:
    /// - `program`: Name used in the error message.
    ///
    /// Output:
    /// - `Ok(self)` unless the command exited non-zero without any output.
    ///
    /// # Errors
    /// - Returns `Err(CommandError::NoOutput)` for a non-zero exit with empty output.
    ///
    /// Details:
    /// - A non-zero exit that still produced output is not an error; apt uses
    ///   the exit status for warnings, so callers inspect the text instead.
    pub fn into_checked(self, program: &str) -> Result<Self, CommandError> {
        if !self.success() && self.is_empty() {
            return Err(CommandError::NoOutput {
                program: program.to_string(),
                exit_code: self.exit_code,
            });
        }
        Ok(self)
    }
}

/// Failure to obtain output from an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the pipes or waiting on the child failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        /// Program being run.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The program exited non-zero and printed nothing.
    #[error("{program} exited with status {exit_code:?} without producing output")]
    NoOutput {
        /// Program that failed.
        program: String,
        /// Exit code, if any.
        exit_code: Option<i32>,
    },
    /// The check deadline passed while the program was running.
    #[error("{program} did not finish before the deadline")]
    TimedOut {
        /// Program that was killed.
        program: String,
    },
    /// The check was cancelled while the program was running.
    #[error("{program} was cancelled")]
    Cancelled {
        /// Program that was killed.
        program: String,
    },
}

/// What: Abstract command execution interface used for spawning `apt-get`,
/// `apt-cache`, `apt` and `find`.
///
/// Inputs:
/// - `program`: Executable name to run (for example, `"apt-cache"`).
/// - `args`: Positional arguments passed to the executable.
/// - `ctx`: Deadline and cancellation for this invocation.
///
/// Output:
/// - `Ok(CommandOutput)` whenever the process ran to completion, whatever its exit status.
///
/// # Errors
/// - Returns `Err(CommandError::Spawn)` when the program cannot be started
/// - Returns `Err(CommandError::TimedOut)` / `Err(CommandError::Cancelled)` when
///   the context ends first; the child is killed and reaped before returning
///
/// Details:
/// - Implementations may script results to enable deterministic unit testing.
/// - Production code relies on [`SystemCommandRunner`].
pub trait CommandRunner: Sync {
    /// # Errors
    /// - See the trait documentation.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        ctx: &CheckContext,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send;
}

/// Real command runner backed by `tokio::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        ctx: &CheckContext,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send {
        run_child(program, args, ctx)
    }
}

/// What: Spawn one child and collect its combined output under `ctx`.
///
/// Details:
/// - The child gets its own process group so helpers it forks die with it.
/// - `kill_on_drop` covers the case where this future itself is dropped.
async fn run_child(
    program: &str,
    args: &[&str],
    ctx: &CheckContext,
) -> Result<CommandOutput, CommandError> {
    tracing::debug!(program, ?args, "executing command");
    if ctx.is_done() {
        return Err(if ctx.cancellation().is_cancelled() {
            Interrupt::Cancelled.into_error(program)
        } else {
            Interrupt::TimedOut.into_error(program)
        });
    }

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| CommandError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let collected = tokio::select! {
        collected = read_pipes(stdout, stderr) => Ok(collected),
        reason = ctx.interrupted() => Err(reason),
    };
    let output = match collected {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            let _ = terminate(child, program, Interrupt::Cancelled).await;
            return Err(CommandError::Io {
                program: program.to_string(),
                source,
            });
        }
        Err(reason) => return Err(terminate(child, program, reason).await),
    };

    let waited = tokio::select! {
        status = child.wait() => Ok(status),
        reason = ctx.interrupted() => Err(reason),
    };
    let status = match waited {
        Ok(status) => status.map_err(|source| CommandError::Io {
            program: program.to_string(),
            source,
        })?,
        Err(reason) => return Err(terminate(child, program, reason).await),
    };

    tracing::debug!(
        program,
        exit_code = ?status.code(),
        bytes = output.len(),
        "command finished"
    );
    Ok(CommandOutput {
        output,
        exit_code: status.code(),
    })
}

/// Read stdout and stderr concurrently so neither pipe can fill up and block the child.
async fn read_pipes<O, E>(stdout: Option<O>, stderr: Option<E>) -> std::io::Result<Vec<u8>>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let (mut out, err) = tokio::try_join!(read_all(stdout), read_all(stderr))?;
    out.extend(err);
    Ok(out)
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// What: Kill a child (and its process group) and reap it.
///
/// Output:
/// - The error describing why the child was stopped.
async fn terminate(mut child: Child, program: &str, reason: Interrupt) -> CommandError {
    tracing::warn!(program, ?reason, "terminating command");
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        kill_group(pid);
    }
    if let Err(err) = child.start_kill() {
        tracing::debug!(program, error = %err, "child already exited");
    }
    if let Err(err) = child.wait().await {
        tracing::warn!(program, error = %err, "failed to reap terminated child");
    }
    reason.into_error(program)
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::debug!(pid, error = %err, "killpg failed");
    }
}
