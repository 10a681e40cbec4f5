//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::InstallerConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "DDAGENT_INSTALLER_CONFIG";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// Resolution order: explicit `--config` path, then [`CONFIG_ENV`], then
/// `~/.ddagent-installer/config.yaml`.
#[derive(Debug, Default)]
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<InstallerConfig> {
        let path = self.path()?;
        if !path.exists() {
            // An explicitly named file must exist.
            anyhow::ensure!(
                self.explicit.is_none(),
                "config file {} does not exist",
                path.display()
            );
            return Ok(InstallerConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(InstallerConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".ddagent-installer").join("config.yaml"))
    }
}
