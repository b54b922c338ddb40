//! External command execution.
//!
//! Every process this crate starts goes through a [`CommandRunner`]. The
//! system implementation spawns with tokio, merges the environment overlay
//! over the inherited environment, and kills the child when the timeout
//! elapses. Failures are results, not errors: a missing executable reports
//! exit code 127 and a timeout reports 124, mirroring shell conventions.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;

use crate::platform::Platform;

/// Default timeout for external commands (10 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Exit code reported when a command is killed for exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when a command could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// A command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub command: String,
    pub args: Vec<String>,
    /// Working directory; `None` inherits the server's.
    pub cwd: Option<PathBuf>,
    /// Variables layered over the inherited environment.
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ExecRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Captured output of a finished (or killed) command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Synthetic result for a command killed after `timeout`.
    pub fn timed_out(timeout: Duration) -> Self {
        Self::new(
            "",
            format!("Command timed out after {}s", timeout.as_secs()),
            TIMEOUT_EXIT_CODE,
        )
    }

    /// True if the command exited with code 0.
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }

    /// True if the command was killed by the timeout.
    pub fn is_timeout(&self) -> bool {
        self.exit_code == TIMEOUT_EXIT_CODE && self.stdout.is_empty()
    }
}

/// Runs external commands.
///
/// Implementations must never panic on command failure; every outcome is
/// an [`ExecutionResult`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, request: ExecRequest) -> ExecutionResult;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, request: ExecRequest) -> ExecutionResult {
        let mut cmd = Command::new(&request.command);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }

        for (key, value) in &request.env {
            cmd.env(key, value);
        }

        tracing::debug!(
            command = %request.command,
            args = ?request.args,
            cwd = ?request.cwd,
            timeout_secs = request.timeout.as_secs(),
            "exec.start"
        );

        match tokio::time::timeout(request.timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                let code = output.status.code().unwrap_or(-1);
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                tracing::debug!(command = %request.command, exit_code = code, "exec.exit");
                ExecutionResult::new(stdout, stderr, code)
            }
            Ok(Err(e)) => {
                tracing::warn!(command = %request.command, error = %e, "exec.spawn_failed");
                ExecutionResult::new(
                    "",
                    format!("{}: failed to execute: {}", request.command, e),
                    SPAWN_FAILURE_EXIT_CODE,
                )
            }
            Err(_) => {
                // Dropping the output future drops the child, which kills it.
                tracing::warn!(
                    command = %request.command,
                    timeout_secs = request.timeout.as_secs(),
                    "exec.timeout"
                );
                ExecutionResult::timed_out(request.timeout)
            }
        }
    }
}

/// Argument vector for `fastlane [<platform>] <lane> [key:value ...]`.
pub fn fastlane_args(
    lane: &str,
    platform: Option<Platform>,
    options: &[(String, String)],
) -> Vec<String> {
    let mut args = Vec::with_capacity(2 + options.len());
    if let Some(platform) = platform {
        args.push(platform.as_str().to_string());
    }
    args.push(lane.to_string());
    args.extend(options.iter().map(|(k, v)| format!("{k}:{v}")));
    args
}
