//! Application service — agent package reconciliation use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Present path: version blacklist → stage artifact → digest blacklist →
//! install unless the installed version already satisfies the marker.
//! Absent path: remediation script (always) → quiet uninstall.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::ports::{
    ArtifactFetcher, FetchOutcome, FileHasher, PackageManager, ProgressReporter, RemediationRunner,
};
use crate::domain::blacklist;
use crate::domain::{
    ArtifactLocation, DesiredState, InstallError, InstallOption, InstallRequest, InstallerDefaults,
    VersionMarker, build_install_options,
};

// ── Public types ──────────────────────────────────────────────────────────────

/// What a present-path run will do, computed without touching the host.
#[derive(Debug, Clone, Serialize)]
pub struct InstallPlan {
    pub artifact: ArtifactLocation,
    pub staging_path: PathBuf,
    pub marker: VersionMarker,
    /// Secret values serialize redacted.
    pub options: Vec<InstallOption>,
}

/// Resolve the artifact, marker and option list for `request`.
///
/// # Errors
///
/// Returns [`InstallError::BlacklistedVersion`] before anything is resolved.
pub fn plan(
    request: &InstallRequest,
    defaults: &InstallerDefaults,
) -> Result<InstallPlan, InstallError> {
    blacklist::check_version(&request.version)?;

    Ok(InstallPlan {
        artifact: ArtifactLocation::for_request(
            request.repo_uri.as_deref(),
            &defaults.base_url,
            request.major_version,
            &request.version,
        ),
        staging_path: request.destination_path.clone(),
        marker: VersionMarker::for_version(&request.version),
        options: build_install_options(request),
    })
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The package was installed (or upgraded) to `marker`.
    Installed { marker: VersionMarker },
    /// The installed version already satisfied the request.
    AlreadyInstalled { version: String },
    /// The package was removed.
    Removed { version: String },
    /// Nothing to remove after remediation.
    AlreadyAbsent,
}

// ── Reconciler ────────────────────────────────────────────────────────────────

/// Drives the agent package toward the state named by an [`InstallRequest`].
///
/// One-shot: performs no retries and is safe to re-run.
pub struct Reconciler<'a, F, H, P, R> {
    defaults: &'a InstallerDefaults,
    fetcher: &'a F,
    hasher: &'a H,
    packages: &'a P,
    remediation: &'a R,
}

impl<'a, F, H, P, R> Reconciler<'a, F, H, P, R>
where
    F: ArtifactFetcher,
    H: FileHasher,
    P: PackageManager,
    R: RemediationRunner,
{
    pub fn new(
        defaults: &'a InstallerDefaults,
        fetcher: &'a F,
        hasher: &'a H,
        packages: &'a P,
        remediation: &'a R,
    ) -> Self {
        Self {
            defaults,
            fetcher,
            hasher,
            packages,
            remediation,
        }
    }

    /// Run one reconciliation for `request`.
    ///
    /// # Errors
    ///
    /// Every [`InstallError`] is fatal for the run and is returned verbatim.
    pub async fn reconcile(
        &self,
        request: &InstallRequest,
        reporter: &impl ProgressReporter,
    ) -> Result<ReconcileOutcome, InstallError> {
        match request.desired_state {
            DesiredState::Present => self.ensure_present(request, reporter).await,
            DesiredState::Absent => self.ensure_absent(reporter).await,
        }
    }

    async fn ensure_present(
        &self,
        request: &InstallRequest,
        reporter: &impl ProgressReporter,
    ) -> Result<ReconcileOutcome, InstallError> {
        let plan = plan(request, self.defaults)?;
        let url = plan.artifact.url.as_str();
        let staged = plan.staging_path.as_path();

        info!(%url, path = %staged.display(), "staging installer");
        reporter.step(&format!("staging installer from {url}"));
        let fetched = self
            .fetcher
            .fetch(url, staged)
            .await
            .map_err(|e| transfer_failure(url, &e))?;
        if fetched == FetchOutcome::Unchanged {
            debug!(path = %staged.display(), "staged installer already current");
        }

        let digest = self
            .hasher
            .sha256_file(staged)
            .map_err(|e| transfer_failure(url, &e.context("hashing staged installer")))?;
        info!(sha256 = %digest, "installer digest computed");
        blacklist::check_digest(&staged.display().to_string(), &digest)?;

        let installed = self
            .packages
            .installed()
            .await
            .map_err(|e| package_failure("query", e))?;
        let current = installed.as_ref().map(|p| p.version.as_str());
        if let Some(version) = current.filter(|v| plan.marker.is_satisfied_by(Some(*v))) {
            info!(%version, marker = %plan.marker, "agent already installed");
            reporter.success(&format!("agent {version} already installed"));
            return Ok(ReconcileOutcome::AlreadyInstalled {
                version: version.to_string(),
            });
        }

        debug!(
            keys = ?plan.options.iter().map(|o| o.key).collect::<Vec<_>>(),
            "installer options"
        );
        reporter.step(&format!("installing agent ({})", plan.marker));
        self.packages
            .install(staged, &plan.options)
            .await
            .map_err(|e| package_failure("install", e))?;

        info!(marker = %plan.marker, "agent installed");
        reporter.success(&format!("agent installed ({})", plan.marker));
        Ok(ReconcileOutcome::Installed { marker: plan.marker })
    }

    async fn ensure_absent(
        &self,
        reporter: &impl ProgressReporter,
    ) -> Result<ReconcileOutcome, InstallError> {
        let script = self.defaults.remediation_script_url.as_str();

        // Unconditional: the installed version cannot be trusted at this point.
        info!(url = %script, "running pre-uninstall remediation");
        reporter.step("running pre-uninstall remediation script");
        self.remediation
            .remediate(script)
            .await
            .map_err(|e| match e.downcast::<InstallError>() {
                Ok(err) => err,
                Err(e) => InstallError::RemediationFailure {
                    url: script.to_string(),
                    detail: format!("{e:#}"),
                },
            })?;

        let installed = self
            .packages
            .installed()
            .await
            .map_err(|e| package_failure("query", e))?;
        let Some(package) = installed else {
            warn!("agent not installed, nothing to remove");
            reporter.success("agent not installed");
            return Ok(ReconcileOutcome::AlreadyAbsent);
        };

        reporter.step(&format!("removing agent {}", package.version));
        self.packages
            .uninstall(&package)
            .await
            .map_err(|e| package_failure("uninstall", e))?;

        info!(version = %package.version, "agent removed");
        reporter.success(&format!("agent {} removed", package.version));
        Ok(ReconcileOutcome::Removed {
            version: package.version,
        })
    }
}

fn transfer_failure(url: &str, err: &anyhow::Error) -> InstallError {
    InstallError::TransferFailure {
        url: url.to_string(),
        reason: format!("{err:#}"),
    }
}

/// Keep a typed error raised by the adapter, otherwise wrap the cause.
fn package_failure(operation: &'static str, err: anyhow::Error) -> InstallError {
    match err.downcast::<InstallError>() {
        Ok(typed) => typed,
        Err(err) => InstallError::PackageOperationFailure {
            operation,
            detail: format!("{err:#}"),
        },
    }
}
