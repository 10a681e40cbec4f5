//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::application::ports::CommandRunner;

/// Default timeout for short host queries (registry lookups, script runs).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for `msiexec` install and uninstall runs.
pub const PACKAGE_OP_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Production `CommandRunner` over tokio process execution
/// with a kill-on-timeout guard.
///
/// On Windows, `tokio::time::timeout` around `.output().await` does NOT kill
/// the child process when the timeout fires. The future is dropped but the
/// OS process keeps running. This implementation uses `tokio::select!` with
/// explicit `child.kill()` to guarantee the process is terminated.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        execute(cmd, program, timeout).await
    }

    async fn run_command_line(
        &self,
        program: &str,
        command_line: &str,
        timeout: Duration,
    ) -> Result<Output> {
        let mut cmd = tokio::process::Command::new(program);
        #[cfg(windows)]
        cmd.raw_arg(command_line);
        // No raw command line outside Windows.
        #[cfg(not(windows))]
        cmd.args(command_line.split_whitespace());
        execute(cmd, program, timeout).await
    }
}

async fn execute(
    mut cmd: tokio::process::Command,
    program: &str,
    timeout: Duration,
) -> Result<Output> {
    // Arguments may carry credentials; only the program is logged.
    debug!(%program, timeout_secs = timeout.as_secs(), "spawning process");
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    tokio::select! {
        result = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stdout_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stderr_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
            );
            Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        } => result,
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
        }
    }
}
