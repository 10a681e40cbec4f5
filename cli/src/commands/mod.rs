//! Command implementations

pub mod apply;
pub mod config;
pub mod metrics;
pub mod plan;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::domain::{DesiredState, InstallError, InstallRequest, InstallerConfig, Secret};

/// Per-run overrides layered on top of the config file.
#[derive(Args, Debug, Default)]
pub struct RequestOverrides {
    /// Agent version to install (`latest` or e.g. 7.30.0)
    #[arg(long = "agent-version", value_name = "VERSION")]
    pub agent_version: Option<String>,

    /// Agent major version line
    #[arg(long)]
    pub major_version: Option<u8>,

    /// Desired package state
    #[arg(long, value_name = "present|absent")]
    pub ensure: Option<DesiredState>,

    /// Datadog API key
    #[arg(long, env = "DD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Hostname reported by the agent
    #[arg(long)]
    pub hostname: Option<String>,

    /// Host tag (repeatable; replaces configured tags)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Base URL the installer is downloaded from
    #[arg(long)]
    pub repo_uri: Option<String>,

    /// Local path the installer is staged at
    #[arg(long)]
    pub staging_path: Option<PathBuf>,
}

impl RequestOverrides {
    /// Apply the overrides to `config` in place.
    pub fn apply_to(&self, config: &mut InstallerConfig) {
        let agent = &mut config.agent;
        if let Some(v) = &self.agent_version {
            agent.version.clone_from(v);
        }
        if let Some(m) = self.major_version {
            agent.major_version = m;
        }
        if let Some(e) = self.ensure {
            agent.ensure = e;
        }
        if let Some(k) = &self.api_key {
            agent.api_key = Some(Secret::new(k.clone()));
        }
        if let Some(h) = &self.hostname {
            agent.hostname = Some(h.clone());
        }
        if !self.tags.is_empty() {
            agent.tags.clone_from(&self.tags);
        }
        if let Some(u) = &self.repo_uri {
            config.installer.repo_uri = Some(u.clone());
        }
        if let Some(p) = &self.staging_path {
            config.installer.staging_path.clone_from(p);
        }
    }
}

/// Load the config, layer `overrides` and build the request.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, or
/// [`InstallError::InvalidRequest`] when validation fails.
pub fn load_request(
    app: &AppContext,
    overrides: &RequestOverrides,
) -> Result<(InstallerConfig, InstallRequest)> {
    let mut config = app.config_store.load()?;
    overrides.apply_to(&mut config);
    let request = config.to_request().map_err(InstallError::from)?;
    Ok((config, request))
}
