//! Known-bad agent releases: version strings and installer digests.

use crate::domain::error::InstallError;

/// Releases whose Windows installer is known to be broken. Exact match.
pub const BLACKLISTED_VERSIONS: &[&str] = &["6.14.0", "6.14.1"];

/// SHA-256 digests (lowercase hex) of installer builds that must never be run.
pub const BLACKLISTED_SHA256: &[&str] = &[
    "928b00d2f952219732cda9ae0515351b15f9b9c1ea1d546738f9dc0fda70c336",
    "78b2bb2b231bcc185eb73dd367bfb6cb8a5d45ba93a46a7890fd607dc9188194",
];

#[must_use]
pub fn is_blacklisted_version(version: &str) -> bool {
    BLACKLISTED_VERSIONS.contains(&version)
}

/// Lowercase a hex digest and drop an optional `sha256:` prefix along with
/// whitespace, `:` and `-` separators.
#[must_use]
pub fn normalize_sha256(digest: &str) -> String {
    let trimmed = digest.trim();
    let body = trimmed
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("sha256:"))
        .map_or(trimmed, |_| &trimmed[7..]);
    body.chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[must_use]
pub fn is_blacklisted_digest(digest: &str) -> bool {
    let normalized = normalize_sha256(digest);
    BLACKLISTED_SHA256.iter().any(|bad| *bad == normalized)
}

/// # Errors
///
/// Returns [`InstallError::BlacklistedVersion`] when `version` is blacklisted.
pub fn check_version(version: &str) -> Result<(), InstallError> {
    if is_blacklisted_version(version) {
        return Err(InstallError::BlacklistedVersion {
            version: version.to_string(),
        });
    }
    Ok(())
}

/// # Errors
///
/// Returns [`InstallError::ChecksumBlacklisted`] when `digest` is blacklisted.
pub fn check_digest(path: &str, digest: &str) -> Result<(), InstallError> {
    if is_blacklisted_digest(digest) {
        return Err(InstallError::ChecksumBlacklisted {
            path: path.to_string(),
            sha256: normalize_sha256(digest),
        });
    }
    Ok(())
}

/// Lowercase hex encoding of a digest.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
