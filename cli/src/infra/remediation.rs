//! Pre-uninstall remediation — implements `RemediationRunner`.
//!
//! The script is staged in a scratch directory and run through PowerShell with
//! the execution policy bypassed for that one process.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::ports::{ArtifactFetcher, CommandRunner, RemediationRunner};
use crate::domain::InstallError;

const FALLBACK_SCRIPT_NAME: &str = "remediation.ps1";

pub struct PowerShellRemediation<'a, F, R> {
    fetcher: &'a F,
    runner: &'a R,
}

impl<'a, F: ArtifactFetcher, R: CommandRunner> PowerShellRemediation<'a, F, R> {
    pub fn new(fetcher: &'a F, runner: &'a R) -> Self {
        Self { fetcher, runner }
    }
}

/// Local path for `url` inside `dir`, named after the last URL segment.
#[must_use]
pub fn script_path(dir: &Path, url: &str) -> PathBuf {
    let name = url
        .split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_SCRIPT_NAME);
    dir.join(name)
}

/// PowerShell arguments executing the script at `path`.
#[must_use]
pub fn powershell_args(path: &Path) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-File".to_string(),
        path.display().to_string(),
    ]
}

impl<F: ArtifactFetcher, R: CommandRunner> RemediationRunner for PowerShellRemediation<'_, F, R> {
    async fn remediate(&self, script_url: &str) -> Result<()> {
        let scratch = tempfile::tempdir().context("creating remediation scratch directory")?;
        let path = script_path(scratch.path(), script_url);

        self.fetcher
            .fetch(script_url, &path)
            .await
            .map_err(|e| InstallError::RemediationFailure {
                url: script_url.to_string(),
                detail: format!("download failed: {e:#}"),
            })?;
        debug!(path = %path.display(), "remediation script staged");

        let args = powershell_args(&path);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run("powershell", &arg_refs)
            .await
            .context("running remediation script")?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(InstallError::RemediationFailure {
                url: script_url.to_string(),
                detail: format!(
                    "script exited with {code}: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }
            .into());
        }
        info!(url = %script_url, "remediation script completed");
        Ok(())
    }
}
