//! Redacting wrapper for credentials carried through the install request.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Placeholder printed wherever a secret would otherwise be shown.
pub const REDACTED: &str = "********";

/// A credential that never appears in `Debug`, `Display` or serialized output.
///
/// Use [`Secret::expose`] at the single point where the raw value must be
/// handed to the package manager.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `true` when the credential is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED})")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}
