//! HTTP artifact transfer — implements `ArtifactFetcher` with `ureq`.
//!
//! Downloads land in a temp file next to the destination and are only moved
//! into place when their digest differs from the file already there.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::ports::{ArtifactFetcher, FetchOutcome};
use crate::infra::fs::sha256_file;

/// Upper bound on a single download.
pub const MAX_DOWNLOAD_BYTES: u64 = 1024 * 1024 * 1024;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Blocking `ureq` client run on the tokio blocking pool.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("ddagent-installer/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent, max_bytes }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, MAX_DOWNLOAD_BYTES)
    }
}

impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchOutcome> {
        let agent = self.agent.clone();
        let max_bytes = self.max_bytes;
        let url = url.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || download(&agent, &url, &dest, max_bytes))
            .await
            .context("spawn_blocking for artifact download")?
    }
}

fn download(agent: &ureq::Agent, url: &str, dest: &Path, max_bytes: u64) -> Result<FetchOutcome> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("creating directory {}", parent.display()))?;

    debug!(%url, "GET");
    let response = agent
        .get(url)
        .call()
        .with_context(|| format!("GET {url}"))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    let mut reader = response.into_reader().take(max_bytes + 1);
    let bytes = std::io::copy(&mut reader, &mut tmp).context("reading response body")?;
    anyhow::ensure!(
        bytes <= max_bytes,
        "{url} exceeds the {max_bytes} byte download limit"
    );
    tmp.flush().context("flushing download")?;

    if dest.exists() && sha256_file(dest)? == sha256_file(tmp.path())? {
        debug!(path = %dest.display(), "destination already holds identical content");
        return Ok(FetchOutcome::Unchanged);
    }

    tmp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("moving download into {}", dest.display()))?;
    info!(%url, path = %dest.display(), bytes, "artifact downloaded");
    Ok(FetchOutcome::Downloaded { bytes })
}
