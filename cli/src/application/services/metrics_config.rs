//! Application service — JMX metric mapping file.
//!
//! Renders the static mapping table and writes it only when the content on
//! disk differs, so repeated runs leave the file untouched.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::LocalFs;
use crate::domain::config::JmxSection;
use crate::domain::metrics::{JMX_METRICS, render_conf};

/// Outcome of writing the mapping file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Render the JMX integration `conf.yaml` for `jmx`.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render_jmx_config(jmx: &JmxSection) -> Result<String> {
    render_conf(JMX_METRICS, &jmx.instances()).context("rendering JMX metric mapping")
}

/// Write `content` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn write_jmx_config(fs: &impl LocalFs, path: &Path, content: &str) -> Result<WriteOutcome> {
    if fs.exists(path) && fs.read_to_string(path)? == content {
        return Ok(WriteOutcome::Unchanged);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)?;
    }
    fs.write(path, content)?;
    info!(path = %path.display(), "JMX metric mapping written");
    Ok(WriteOutcome::Written)
}
