//! Windows Installer backend — implements `PackageManager` over `msiexec`.
//!
//! The installed package is looked up in the `Uninstall` registry hive through
//! PowerShell so both the display version and the product code are available.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::ports::{CommandRunner, PackageManager};
use crate::domain::{InstallError, InstallOption, InstalledPackage};
use crate::infra::command_runner::PACKAGE_OP_TIMEOUT;

/// Exit codes `msiexec` uses for success, including "reboot required".
pub const MSI_SUCCESS_CODES: &[i32] = &[0, 1641, 3010];

const UNINSTALL_KEYS: &str = r"HKLM:\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\*";

/// `PackageManager` backed by `msiexec` and a registry query.
pub struct MsiPackageManager<'a, R> {
    runner: &'a R,
    product_name: String,
}

impl<'a, R: CommandRunner> MsiPackageManager<'a, R> {
    pub fn new(runner: &'a R, product_name: impl Into<String>) -> Self {
        Self {
            runner,
            product_name: product_name.into(),
        }
    }
}

#[derive(Deserialize)]
struct RegistryEntry {
    #[serde(rename = "PSChildName")]
    product_code: String,
    #[serde(rename = "DisplayName")]
    name: String,
    #[serde(rename = "DisplayVersion")]
    version: String,
}

/// PowerShell command selecting the first uninstall entry named `product_name`.
#[must_use]
pub fn query_script(product_name: &str) -> String {
    let name = product_name.replace('\'', "''");
    format!(
        "Get-ItemProperty -Path '{UNINSTALL_KEYS}' -ErrorAction SilentlyContinue \
         | Where-Object {{ $_.DisplayName -eq '{name}' }} \
         | Select-Object -First 1 PSChildName, DisplayName, DisplayVersion \
         | ConvertTo-Json -Compress"
    )
}

/// Parse the query output. Empty output means not installed.
///
/// # Errors
///
/// Returns an error if the output is not the expected JSON object.
pub fn parse_installed(stdout: &str) -> Result<Option<InstalledPackage>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let entry: RegistryEntry =
        serde_json::from_str(trimmed).context("parsing installed package query output")?;
    Ok(Some(InstalledPackage {
        name: entry.name,
        version: entry.version,
        product_code: entry.product_code,
    }))
}

/// msiexec quoting: the value is wrapped in `"` and embedded quotes doubled.
#[must_use]
pub fn msi_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `KEY=VALUE` as msiexec reads it. Values that are already quoted pass
/// through; values containing whitespace or quotes get quoted.
fn property(key: &str, value: &str) -> String {
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if quoted || !value.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("{key}={value}")
    } else {
        format!("{key}={}", msi_quote(value))
    }
}

/// Raw `msiexec` command line installing `artifact` with `options`.
///
/// Passed verbatim to the process so property quoting reaches msiexec intact.
#[must_use]
pub fn install_command_line(artifact: &Path, options: &[InstallOption]) -> String {
    let mut parts = vec![
        "/i".to_string(),
        msi_quote(&artifact.display().to_string()),
        "/qn".to_string(),
        "/norestart".to_string(),
    ];
    parts.extend(options.iter().map(|o| property(o.key, o.value.expose())));
    parts.join(" ")
}

/// `msiexec` arguments silently removing `product_code`.
#[must_use]
pub fn uninstall_args(product_code: &str) -> Vec<String> {
    vec!["/x".to_string(), product_code.to_string(), "/quiet".to_string()]
}

/// Map an `msiexec` exit code to success or a typed failure.
///
/// # Errors
///
/// Returns [`InstallError::PackageOperationFailure`] for any code outside
/// [`MSI_SUCCESS_CODES`], or when the process was terminated without one.
pub fn check_code(
    operation: &'static str,
    code: Option<i32>,
    stderr: &[u8],
) -> Result<(), InstallError> {
    if code.is_some_and(|c| MSI_SUCCESS_CODES.contains(&c)) {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(stderr);
    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    Err(InstallError::PackageOperationFailure {
        operation,
        detail: format!("msiexec exited with {code}: {}", stderr.trim()),
    })
}

/// # Errors
///
/// See [`check_code`].
pub fn check_exit(operation: &'static str, output: &Output) -> Result<(), InstallError> {
    check_code(operation, output.status.code(), &output.stderr)
}

impl<R: CommandRunner> PackageManager for MsiPackageManager<'_, R> {
    async fn installed(&self) -> Result<Option<InstalledPackage>> {
        let script = query_script(&self.product_name);
        let output = self
            .runner
            .run("powershell", &["-NoProfile", "-NonInteractive", "-Command", &script])
            .await
            .context("querying installed agent package")?;
        anyhow::ensure!(
            output.status.success(),
            "installed package query failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        let package = parse_installed(&String::from_utf8_lossy(&output.stdout))?;
        debug!(installed = ?package.as_ref().map(|p| &p.version), "installed package query");
        Ok(package)
    }

    async fn install(&self, artifact: &Path, options: &[InstallOption]) -> Result<()> {
        let command_line = install_command_line(artifact, options);
        let output = self
            .runner
            .run_command_line("msiexec", &command_line, PACKAGE_OP_TIMEOUT)
            .await
            .context("running msiexec install")?;
        check_exit("install", &output)?;
        info!(artifact = %artifact.display(), "msiexec install finished");
        Ok(())
    }

    async fn uninstall(&self, package: &InstalledPackage) -> Result<()> {
        let args = uninstall_args(&package.product_code);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout("msiexec", &arg_refs, PACKAGE_OP_TIMEOUT)
            .await
            .context("running msiexec uninstall")?;
        check_exit("uninstall", &output)?;
        info!(product_code = %package.product_code, "msiexec uninstall finished");
        Ok(())
    }
}
