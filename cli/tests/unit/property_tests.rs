//! Property-based tests for option building, digest normalization and
//! artifact resolution.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use ddagent_installer::domain::blacklist::{
    BLACKLISTED_SHA256, is_blacklisted_digest, is_blacklisted_version, normalize_sha256,
};
use ddagent_installer::domain::artifact::DEFAULT_BASE_URL;
use ddagent_installer::domain::options::quote_tags;
use ddagent_installer::domain::{
    ArtifactLocation, InstallRequest, Secret, VersionMarker, build_install_options,
};

use crate::helpers::present_request;

// ============================================================================
// build_install_options() property tests
// ============================================================================

proptest! {
    /// APIKEY always comes first and keys never repeat.
    #[test]
    fn prop_options_start_with_api_key_and_are_unique(
        hostname in proptest::option::of("[a-z0-9-]{0,12}"),
        tags in proptest::collection::vec("[a-z]{1,6}:[a-z0-9]{1,6}", 0..5),
        npm in any::<bool>(),
        user in proptest::option::of("[a-z]{0,8}"),
        password in proptest::option::of("[ -~]{0,12}"),
    ) {
        let request = InstallRequest {
            hostname,
            tags,
            npm_enabled: npm,
            service_account_name: user,
            service_account_password: password.map(Secret::new),
            ..present_request("7.30.0")
        };
        let options = build_install_options(&request);
        let keys: Vec<_> = options.iter().map(|o| o.key).collect();

        prop_assert_eq!(keys[0], "APIKEY");
        let mut deduped = keys.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), keys.len());
    }

    /// A password is never passed without a service account name.
    #[test]
    fn prop_password_requires_name(password in "[ -~]{1,16}") {
        let request = InstallRequest {
            service_account_name: None,
            service_account_password: Some(Secret::new(password)),
            ..present_request("7.30.0")
        };
        let options = build_install_options(&request);
        prop_assert!(options.iter().all(|o| o.key != "DDAGENTUSER_PASSWORD"));
    }

    /// Quoted tags are wrapped in quotes and contain no lone embedded quote.
    #[test]
    fn prop_quoted_tags_are_balanced(tags in proptest::collection::vec("[a-z\"]{1,6}", 1..4)) {
        let quoted = quote_tags(&tags);
        prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        let inner = &quoted[1..quoted.len() - 1];
        prop_assert_eq!(inner.matches('"').count() % 2, 0);
    }
}

// ============================================================================
// Digest normalization property tests
// ============================================================================

proptest! {
    /// Normalization is idempotent.
    #[test]
    fn prop_normalize_is_idempotent(digest in "[0-9a-fA-F:\\- ]{0,80}") {
        let once = normalize_sha256(&digest);
        prop_assert_eq!(normalize_sha256(&once), once);
    }

    /// Case and separators never hide a blacklisted digest.
    #[test]
    fn prop_blacklisted_digest_detected_in_any_form(
        idx in 0..BLACKLISTED_SHA256.len(),
        upper in any::<bool>(),
        sep in prop_oneof![Just(""), Just(":"), Just("-"), Just(" ")],
        prefix in any::<bool>(),
    ) {
        let bad = BLACKLISTED_SHA256[idx];
        let body: String = bad
            .as_bytes()
            .chunks(2)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join(sep);
        let body = if upper { body.to_ascii_uppercase() } else { body };
        let digest = if prefix { format!("sha256:{body}") } else { body };
        prop_assert!(is_blacklisted_digest(&digest), "missed: {}", digest);
    }

    /// Random 64-char hex digests are not blacklisted.
    #[test]
    fn prop_random_digest_is_clean(digest in "[0-9a-f]{64}") {
        prop_assume!(!BLACKLISTED_SHA256.contains(&digest.as_str()));
        prop_assert!(!is_blacklisted_digest(&digest));
    }
}

// ============================================================================
// Version handling property tests
// ============================================================================

proptest! {
    /// Pinned versions map to the pinned URL and the suffixed marker.
    #[test]
    fn prop_pinned_version_resolution(
        major in 6u8..=7,
        minor in 0u32..100,
        patch in 0u32..10,
    ) {
        let version = format!("{major}.{minor}.{patch}");
        let url = ArtifactLocation::for_request(None, DEFAULT_BASE_URL, major, &version).url;
        prop_assert!(url.ends_with(&format!("/ddagent-cli-{version}.msi")), "{}", url);
        prop_assert_eq!(
            VersionMarker::for_version(&version),
            VersionMarker::Exact(format!("{version}.1"))
        );
    }

    /// Only the two known-broken releases are blacklisted.
    #[test]
    fn prop_version_blacklist_is_exact(minor in 0u32..100, patch in 0u32..10) {
        let version = format!("6.{minor}.{patch}");
        let expected = minor == 14 && patch <= 1;
        prop_assert_eq!(is_blacklisted_version(&version), expected);
    }
}

#[test]
fn test_latest_resolution_per_major() {
    for major in [6, 7] {
        let url = ArtifactLocation::for_request(Some("  "), DEFAULT_BASE_URL, major, "latest").url;
        assert_eq!(
            url,
            format!(
                "https://s3.amazonaws.com/ddagent-windows-stable/datadog-agent-{major}-latest.amd64.msi"
            )
        );
    }
    assert_eq!(VersionMarker::for_version("latest"), VersionMarker::Installed);
}
