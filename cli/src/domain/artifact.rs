//! Installer artifact location and installed-version marker.
//!
//! Pure functions only. No I/O.

use std::fmt;

use serde::Serialize;

// ── Constants ────────────────────────────────────────────────────────────────

/// Version keyword selecting the most recent release of a major version.
pub const LATEST: &str = "latest";

/// Base URL used when no `repo_uri` override is configured.
pub const DEFAULT_BASE_URL: &str = "https://s3.amazonaws.com/ddagent-windows-stable/";

/// Remediation script run before every uninstall.
pub const DEFAULT_REMEDIATION_SCRIPT_URL: &str =
    "https://s3.amazonaws.com/ddagent-windows-stable/scripts/fix_6_14.ps1";

/// Display name the package registers under.
pub const DEFAULT_PRODUCT_NAME: &str = "Datadog Agent";

/// The packaging system appends this to the published version.
pub const INSTALLED_VERSION_SUFFIX: &str = ".1";

// ── Artifact location ────────────────────────────────────────────────────────

/// Resolved download location of the installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactLocation {
    pub url: String,
}

impl ArtifactLocation {
    /// Resolve the download URL for `version` under `base`.
    ///
    /// `latest` uses `datadog-agent-{major}-latest.amd64.msi`; a pinned version
    /// uses `ddagent-cli-{version}.msi`. A missing trailing `/` on `base` is added.
    #[must_use]
    pub fn resolve(base: &str, major_version: u8, version: &str) -> Self {
        let base = base.trim();
        let sep = if base.ends_with('/') { "" } else { "/" };
        let file = if version == LATEST {
            format!("datadog-agent-{major_version}-latest.amd64.msi")
        } else {
            format!("ddagent-cli-{version}.msi")
        };
        Self {
            url: format!("{base}{sep}{file}"),
        }
    }

    /// Like [`resolve`](Self::resolve), falling back to `default_base`
    /// (normally [`DEFAULT_BASE_URL`]) when `repo_uri` is absent or blank.
    #[must_use]
    pub fn for_request(
        repo_uri: Option<&str>,
        default_base: &str,
        major_version: u8,
        version: &str,
    ) -> Self {
        let base = repo_uri
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or(default_base);
        Self::resolve(base, major_version, version)
    }
}

// ── Installed-version marker ─────────────────────────────────────────────────

/// What the package manager must report for the package to count as installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "version", rename_all = "lowercase")]
pub enum VersionMarker {
    /// Any installed version satisfies the request (`version: latest`).
    Installed,
    /// Exactly this on-disk version.
    Exact(String),
}

impl VersionMarker {
    #[must_use]
    pub fn for_version(version: &str) -> Self {
        if version == LATEST {
            Self::Installed
        } else {
            Self::Exact(format!("{version}{INSTALLED_VERSION_SUFFIX}"))
        }
    }

    /// Whether the currently installed version (if any) satisfies this marker.
    #[must_use]
    pub fn is_satisfied_by(&self, installed: Option<&str>) -> bool {
        match (self, installed) {
            (_, None) => false,
            (Self::Installed, Some(_)) => true,
            (Self::Exact(want), Some(have)) => want == have.trim(),
        }
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed => f.write_str("installed"),
            Self::Exact(v) => f.write_str(v),
        }
    }
}
