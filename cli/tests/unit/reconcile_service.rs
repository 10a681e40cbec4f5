//! Tests for the `reconcile` application service.
//!
//! All collaborators are recording mocks; assertions are on the returned
//! outcome or error and on the order the ports were driven in.

#![allow(clippy::expect_used)]

use ddagent_installer::application::services::reconcile::{ReconcileOutcome, Reconciler};
use ddagent_installer::domain::blacklist::BLACKLISTED_SHA256;
use ddagent_installer::domain::{
    InstallError, InstallRequest, InstallerDefaults, OptionValue, VersionMarker,
};

use crate::helpers::{API_KEY, absent_request, package, present_request};
use crate::mocks::{
    Events, MockFetcher, MockHasher, MockPackages, MockRemediation, RecordingReporter,
};

const DEFAULT_BASE: &str = "https://s3.amazonaws.com/ddagent-windows-stable/";
const FIX_SCRIPT: &str = "https://s3.amazonaws.com/ddagent-windows-stable/scripts/fix_6_14.ps1";

async fn reconcile(
    request: &InstallRequest,
    fetcher: &MockFetcher,
    hasher: &MockHasher,
    packages: &MockPackages,
    remediation: &MockRemediation,
) -> Result<ReconcileOutcome, InstallError> {
    let defaults = InstallerDefaults::default();
    let reporter = RecordingReporter::default();
    Reconciler::new(&defaults, fetcher, hasher, packages, remediation)
        .reconcile(request, &reporter)
        .await
}

// ── Present path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_blacklisted_versions_fail_before_any_fetch() {
    for version in ["6.14.0", "6.14.1"] {
        let events = Events::default();
        let err = reconcile(
            &present_request(version),
            &MockFetcher::new(&events),
            &MockHasher::clean(&events),
            &MockPackages::new(&events, None),
            &MockRemediation::new(&events),
        )
        .await
        .expect_err("blacklisted version must fail");

        assert!(
            matches!(err, InstallError::BlacklistedVersion { version: ref v } if v == version),
            "got: {err}"
        );
        assert!(events.all().is_empty(), "no port may be touched: {:?}", events.all());
    }
}

#[tokio::test]
async fn test_blacklisted_digest_blocks_install() {
    for bad in BLACKLISTED_SHA256 {
        let events = Events::default();
        let packages = MockPackages::new(&events, None);
        let shouted = bad.to_ascii_uppercase();
        let err = reconcile(
            &present_request("7.30.0"),
            &MockFetcher::new(&events),
            &MockHasher::with_digest(&events, &shouted),
            &packages,
            &MockRemediation::new(&events),
        )
        .await
        .expect_err("blacklisted digest must fail");

        assert_eq!(err.code(), "CHECKSUM_BLACKLISTED");
        assert!(err.to_string().contains(bad), "digest normalized: {err}");
        assert!(events.any("fetch "));
        assert!(!events.any("install "), "install must not run: {:?}", events.all());
    }
}

#[tokio::test]
async fn test_pinned_version_uses_default_base_and_pinned_pattern() {
    let events = Events::default();
    let packages = MockPackages::new(&events, None);
    let outcome = reconcile(
        &present_request("6.14.2"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &packages,
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert_eq!(
        events.all()[0],
        format!("fetch {DEFAULT_BASE}ddagent-cli-6.14.2.msi")
    );
    assert_eq!(
        outcome,
        ReconcileOutcome::Installed {
            marker: VersionMarker::Exact("6.14.2.1".into())
        }
    );
}

#[tokio::test]
async fn test_latest_uses_latest_pattern_and_generic_marker() {
    let events = Events::default();
    let outcome = reconcile(
        &present_request("latest"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, None),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert_eq!(
        events.all()[0],
        format!("fetch {DEFAULT_BASE}datadog-agent-7-latest.amd64.msi")
    );
    assert_eq!(
        outcome,
        ReconcileOutcome::Installed {
            marker: VersionMarker::Installed
        }
    );
}

#[tokio::test]
async fn test_repo_uri_overrides_default_base() {
    let events = Events::default();
    let request = InstallRequest {
        repo_uri: Some("https://mirror.internal/datadog".into()),
        ..present_request("7.30.0")
    };
    reconcile(
        &request,
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, None),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert_eq!(
        events.all()[0],
        "fetch https://mirror.internal/datadog/ddagent-cli-7.30.0.msi"
    );
}

#[tokio::test]
async fn test_install_receives_ordered_options_with_raw_secret() {
    let events = Events::default();
    let packages = MockPackages::new(&events, None);
    reconcile(
        &present_request("7.30.0"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &packages,
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    let options = packages.captured_options();
    let keys: Vec<_> = options.iter().map(|o| o.key).collect();
    assert_eq!(keys, vec!["APIKEY", "HOSTNAME", "TAGS"]);
    assert_eq!(options[0].value.expose(), API_KEY);
    assert!(matches!(options[0].value, OptionValue::Secret(_)));
    assert_eq!(options[2].value.expose(), "\"env:prod,role:web\"");
}

#[tokio::test]
async fn test_matching_installed_version_skips_install() {
    let events = Events::default();
    let outcome = reconcile(
        &present_request("7.30.0"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, Some(package("7.30.0.1"))),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert_eq!(
        outcome,
        ReconcileOutcome::AlreadyInstalled {
            version: "7.30.0.1".into()
        }
    );
    assert!(!events.any("install "));
}

#[tokio::test]
async fn test_different_installed_version_is_upgraded() {
    let events = Events::default();
    let outcome = reconcile(
        &present_request("7.31.0"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, Some(package("7.30.0.1"))),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert!(matches!(outcome, ReconcileOutcome::Installed { .. }));
    assert!(events.any("install "));
}

#[tokio::test]
async fn test_present_path_order_is_fetch_hash_query_install() {
    let events = Events::default();
    reconcile(
        &present_request("7.30.0"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, None),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    let fetch = events.position("fetch ").expect("fetch");
    let hash = events.position("hash ").expect("hash");
    let query = events.position("query").expect("query");
    let install = events.position("install ").expect("install");
    assert!(fetch < hash && hash < query && query < install, "{:?}", events.all());
    assert!(!events.any("remediate "), "present path never remediates");
}

#[tokio::test]
async fn test_fetch_failure_is_transfer_failure() {
    let events = Events::default();
    let err = reconcile(
        &present_request("7.30.0"),
        &MockFetcher::failing(&events, "connection reset by peer"),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, None),
        &MockRemediation::new(&events),
    )
    .await
    .expect_err("fetch failure");

    assert_eq!(err.code(), "TRANSFER_FAILURE");
    assert!(err.to_string().contains("connection reset by peer"));
    assert!(!events.any("hash "));
    assert!(!events.any("install "));
}

#[tokio::test]
async fn test_install_failure_is_surfaced_verbatim() {
    let events = Events::default();
    let mut packages = MockPackages::new(&events, None);
    packages.install_error = Some("msiexec exited with 1603: fatal error".into());
    let err = reconcile(
        &present_request("7.30.0"),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &packages,
        &MockRemediation::new(&events),
    )
    .await
    .expect_err("install failure");

    assert_eq!(err.code(), "PACKAGE_OPERATION_FAILURE");
    assert!(err.to_string().contains("1603"), "got: {err}");
}

// ── Absent path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_absent_runs_remediation_before_uninstall() {
    let events = Events::default();
    let outcome = reconcile(
        &absent_request(),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, Some(package("6.14.1.1"))),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert_eq!(
        outcome,
        ReconcileOutcome::Removed {
            version: "6.14.1.1".into()
        }
    );
    let remediate = events.position("remediate ").expect("remediate");
    let uninstall = events.position("uninstall ").expect("uninstall");
    assert!(remediate < uninstall, "{:?}", events.all());
    assert_eq!(events.all()[remediate], format!("remediate {FIX_SCRIPT}"));
    assert!(!events.any("fetch "), "absent path stages no installer");
}

#[tokio::test]
async fn test_absent_remediates_even_when_nothing_installed() {
    let events = Events::default();
    let outcome = reconcile(
        &absent_request(),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, None),
        &MockRemediation::new(&events),
    )
    .await
    .expect("reconcile");

    assert_eq!(outcome, ReconcileOutcome::AlreadyAbsent);
    assert!(events.any("remediate "));
    assert!(!events.any("uninstall "));
}

#[tokio::test]
async fn test_absent_remediation_failure_halts_before_uninstall() {
    let events = Events::default();
    let mut remediation = MockRemediation::new(&events);
    remediation.fail = true;
    let err = reconcile(
        &absent_request(),
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, Some(package("7.30.0.1"))),
        &remediation,
    )
    .await
    .expect_err("remediation failure");

    assert_eq!(err.code(), "REMEDIATION_FAILURE");
    assert!(!events.any("uninstall "));
}

#[tokio::test]
async fn test_absent_ignores_install_only_fields() {
    let events = Events::default();
    let request = InstallRequest {
        version: "6.14.0".into(),
        ..absent_request()
    };
    let outcome = reconcile(
        &request,
        &MockFetcher::new(&events),
        &MockHasher::clean(&events),
        &MockPackages::new(&events, None),
        &MockRemediation::new(&events),
    )
    .await
    .expect("blacklist does not apply to removal");

    assert_eq!(outcome, ReconcileOutcome::AlreadyAbsent);
}
