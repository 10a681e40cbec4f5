//! Configuration schema and validation.
//!
//! Pure functions only. No I/O.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::artifact::{
    DEFAULT_BASE_URL, DEFAULT_PRODUCT_NAME, DEFAULT_REMEDIATION_SCRIPT_URL, LATEST,
};
use crate::domain::error::ConfigError;
use crate::domain::metrics::JmxInstance;
use crate::domain::request::{DesiredState, InstallRequest};
use crate::domain::secret::Secret;

// ── Constants ────────────────────────────────────────────────────────────────

pub const SUPPORTED_MAJOR_VERSIONS: &[u8] = &[6, 7];

const DEFAULT_STAGING_PATH: &str = r"C:\Windows\Temp\datadog-agent.msi";
const DEFAULT_JMX_CONF_PATH: &str = r"C:\ProgramData\Datadog\conf.d\tomcat.d\conf.yaml";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.ddagent-installer/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InstallerConfig {
    pub agent: AgentSection,
    pub installer: InstallerSection,
    pub jmx: JmxSection,
}

/// Desired agent package state and install-time settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub ensure: DesiredState,
    pub major_version: u8,
    pub version: String,
    pub api_key: Option<Secret>,
    pub hostname: Option<String>,
    pub tags: Vec<String>,
    pub npm: bool,
    pub ddagentuser_name: Option<String>,
    pub ddagentuser_password: Option<Secret>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            ensure: DesiredState::Present,
            major_version: 7,
            version: LATEST.to_string(),
            api_key: None,
            hostname: None,
            tags: Vec::new(),
            npm: false,
            ddagentuser_name: None,
            ddagentuser_password: None,
        }
    }
}

/// Where the installer comes from and how the package is identified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSection {
    /// Overrides [`DEFAULT_BASE_URL`].
    pub repo_uri: Option<String>,
    pub staging_path: PathBuf,
    pub remediation_script_url: String,
    pub product_name: String,
}

impl Default for InstallerSection {
    fn default() -> Self {
        Self {
            repo_uri: None,
            staging_path: PathBuf::from(DEFAULT_STAGING_PATH),
            remediation_script_url: DEFAULT_REMEDIATION_SCRIPT_URL.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
        }
    }
}

/// JMX integration file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JmxSection {
    pub conf_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for JmxSection {
    fn default() -> Self {
        Self {
            conf_path: PathBuf::from(DEFAULT_JMX_CONF_PATH),
            host: "localhost".to_string(),
            port: 9012,
        }
    }
}

impl JmxSection {
    #[must_use]
    pub fn instances(&self) -> Vec<JmxInstance> {
        vec![JmxInstance {
            host: self.host.clone(),
            port: self.port,
        }]
    }
}

/// Fixed collaborator locations handed to the reconciler at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerDefaults {
    pub base_url: String,
    pub remediation_script_url: String,
    pub product_name: String,
}

impl Default for InstallerDefaults {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            remediation_script_url: DEFAULT_REMEDIATION_SCRIPT_URL.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Accepts `latest` or a semver version (`7.30.0`, `7.31.0-rc.2`).
///
/// # Errors
///
/// Returns an error for anything else.
pub fn validate_version(version: &str) -> Result<(), ConfigError> {
    if version == LATEST || semver::Version::parse(version).is_ok() {
        return Ok(());
    }
    Err(ConfigError::InvalidVersion(version.to_string()))
}

/// # Errors
///
/// Returns an error when `major` is not a supported Windows agent line.
pub fn validate_major_version(major: u8) -> Result<(), ConfigError> {
    if SUPPORTED_MAJOR_VERSIONS.contains(&major) {
        return Ok(());
    }
    let supported = SUPPORTED_MAJOR_VERSIONS
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(ConfigError::UnsupportedMajorVersion(major, supported))
}

impl InstallerConfig {
    #[must_use]
    pub fn defaults(&self) -> InstallerDefaults {
        InstallerDefaults {
            base_url: DEFAULT_BASE_URL.to_string(),
            remediation_script_url: self.installer.remediation_script_url.clone(),
            product_name: self.installer.product_name.clone(),
        }
    }

    /// Build the request for one reconciliation run.
    ///
    /// Installation fields are only validated when `agent.ensure` is `present`.
    ///
    /// # Errors
    ///
    /// Returns an error if a present-path field is missing or malformed.
    pub fn to_request(&self) -> Result<InstallRequest, ConfigError> {
        let agent = &self.agent;
        let api_key = agent.api_key.clone().unwrap_or_default();

        if agent.ensure == DesiredState::Present {
            validate_major_version(agent.major_version)?;
            validate_version(&agent.version)?;
            if api_key.is_blank() {
                return Err(ConfigError::MissingApiKey);
            }
            if self.installer.staging_path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyStagingPath);
            }
        }

        Ok(InstallRequest {
            major_version: agent.major_version,
            version: agent.version.clone(),
            repo_uri: self.installer.repo_uri.clone(),
            destination_path: self.installer.staging_path.clone(),
            api_key,
            hostname: agent.hostname.clone(),
            tags: agent.tags.clone(),
            desired_state: agent.ensure,
            npm_enabled: agent.npm,
            service_account_name: agent.ddagentuser_name.clone(),
            service_account_password: agent.ddagentuser_password.clone(),
        })
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
