//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Install errors ────────────────────────────────────────────────────────────

/// Failures of a single reconciliation run. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Agent version {version} is blacklisted (known-broken release). Pin another version.")]
    BlacklistedVersion { version: String },

    #[error(
        "Installer {path} has blacklisted SHA-256 {sha256}. Refusing to install a known-bad build."
    )]
    ChecksumBlacklisted { path: String, sha256: String },

    #[error("Failed to transfer {url}: {reason}")]
    TransferFailure { url: String, reason: String },

    #[error("Package {operation} failed: {detail}")]
    PackageOperationFailure {
        operation: &'static str,
        detail: String,
    },

    #[error("Remediation script {url} failed: {detail}")]
    RemediationFailure { url: String, detail: String },

    #[error("Invalid install request: {0}")]
    InvalidRequest(String),
}

impl InstallError {
    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlacklistedVersion { .. } => "BLACKLISTED_VERSION",
            Self::ChecksumBlacklisted { .. } => "CHECKSUM_BLACKLISTED",
            Self::TransferFailure { .. } => "TRANSFER_FAILURE",
            Self::PackageOperationFailure { .. } => "PACKAGE_OPERATION_FAILURE",
            Self::RemediationFailure { .. } => "REMEDIATION_FAILURE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors from validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported agent major version {0}. Supported: {1}")]
    UnsupportedMajorVersion(u8, String),

    #[error("Invalid agent version '{0}': expected 'latest' or a version like 7.30.0")]
    InvalidVersion(String),

    #[error("agent.api_key is required when agent.ensure is 'present'")]
    MissingApiKey,

    #[error("installer.staging_path must not be empty")]
    EmptyStagingPath,
}

impl From<ConfigError> for InstallError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}
