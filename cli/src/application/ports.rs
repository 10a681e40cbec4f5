//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{InstallOption, InstalledPackage, InstallerConfig};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program whose argument string is passed through verbatim.
    ///
    /// For programs such as `msiexec` that parse their own command line
    /// instead of following the C runtime quoting rules.
    ///
    /// # Errors
    ///
    /// Same as [`CommandRunner::run_with_timeout`].
    async fn run_command_line(
        &self,
        program: &str,
        command_line: &str,
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Artifact Transfer Port ────────────────────────────────────────────────────

/// Result of staging a remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// New content was written to the destination.
    Downloaded { bytes: u64 },
    /// The destination already held identical content and was left untouched.
    Unchanged,
}

/// Downloads a remote file to a local path.
#[allow(async_fn_in_trait)]
pub trait ArtifactFetcher {
    /// Stage `url` at `dest`. Re-fetching identical content is a no-op.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchOutcome>;
}

// ── Hashing Port ──────────────────────────────────────────────────────────────

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the SHA-256 hash of a file as lowercase hex.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

// ── Package Manager Port ──────────────────────────────────────────────────────

/// Host package manager operations for the agent package.
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    /// The installed agent package, or `None` when it is not installed.
    async fn installed(&self) -> Result<Option<InstalledPackage>>;
    /// Install the staged artifact with the given options.
    async fn install(&self, artifact: &Path, options: &[InstallOption]) -> Result<()>;
    /// Silently remove the package.
    async fn uninstall(&self, package: &InstalledPackage) -> Result<()>;
}

// ── Remediation Port ──────────────────────────────────────────────────────────

/// Downloads and executes the pre-uninstall remediation script.
#[allow(async_fn_in_trait)]
pub trait RemediationRunner {
    async fn remediate(&self, script_url: &str) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config and Filesystem Ports ───────────────────────────────────────────────

/// Abstracts loading the installer configuration.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<InstallerConfig>;
    /// Path the configuration is read from.
    fn path(&self) -> Result<PathBuf>;
}

/// Abstracts the local filesystem writes performed by application services.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}
