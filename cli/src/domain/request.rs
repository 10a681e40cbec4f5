//! The install request consumed by one reconciliation run.
//!
//! Pure data, built from configuration by
//! [`InstallerConfig::to_request`](crate::domain::config::InstallerConfig::to_request).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::artifact::LATEST;
use crate::domain::secret::Secret;

/// Target package state on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::Absent => "absent",
        })
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" | "installed" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!("invalid state '{other}' (expected present or absent)")),
        }
    }
}

/// Everything needed to drive the agent package toward its desired state.
///
/// When `desired_state` is [`DesiredState::Absent`] only `desired_state` is
/// read; the installation fields are ignored.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub major_version: u8,
    /// `"latest"` or a pinned version such as `"7.30.0"`.
    pub version: String,
    /// Base URL overriding the default artifact location.
    pub repo_uri: Option<String>,
    /// Where the installer artifact is staged on the host.
    pub destination_path: PathBuf,
    pub api_key: Secret,
    pub hostname: Option<String>,
    pub tags: Vec<String>,
    pub desired_state: DesiredState,
    /// Enables the network performance monitoring feature.
    pub npm_enabled: bool,
    pub service_account_name: Option<String>,
    pub service_account_password: Option<Secret>,
}

impl InstallRequest {
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }
}

/// A package as reported by the host package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    pub name: String,
    /// On-disk version, e.g. `7.30.0.1`.
    pub version: String,
    /// Identifier the package manager needs to remove the package.
    pub product_code: String,
}
