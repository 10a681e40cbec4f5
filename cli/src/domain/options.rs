//! Installer option builder.
//!
//! Each optional entry is gated by a presence check on the request; an input
//! that is absent or blank produces no option at all.

use std::fmt;

use serde::Serialize;

use crate::domain::request::InstallRequest;
use crate::domain::secret::Secret;

pub const APIKEY: &str = "APIKEY";
pub const HOSTNAME: &str = "HOSTNAME";
pub const TAGS: &str = "TAGS";
pub const ADDLOCAL: &str = "ADDLOCAL";
pub const DDAGENTUSER_NAME: &str = "DDAGENTUSER_NAME";
pub const DDAGENTUSER_PASSWORD: &str = "DDAGENTUSER_PASSWORD";

/// Feature set enabling network performance monitoring.
pub const NPM_FEATURES: &str = "MainApplication,NPM";

/// Value of an installer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Plain(String),
    Secret(Secret),
}

impl OptionValue {
    /// The raw value handed to the package manager.
    #[must_use]
    pub fn expose(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Secret(s) => s.expose(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(v) => f.write_str(v),
            Self::Secret(s) => fmt::Display::fmt(s, f),
        }
    }
}

/// One `KEY=VALUE` pair passed to the installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOption {
    pub key: &'static str,
    pub value: OptionValue,
}

impl InstallOption {
    fn plain(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: OptionValue::Plain(value.into()),
        }
    }

    fn secret(key: &'static str, value: Secret) -> Self {
        Self {
            key,
            value: OptionValue::Secret(value),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Join tags with `,` and wrap the result in double quotes, doubling any
/// embedded quote the way `msiexec` property values expect.
#[must_use]
pub fn quote_tags(tags: &[String]) -> String {
    let joined = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    format!("\"{}\"", joined.replace('"', "\"\""))
}

/// Build the ordered installer option list for `request`.
///
/// Order: `APIKEY`, `HOSTNAME`, `TAGS`, `ADDLOCAL`, `DDAGENTUSER_NAME`,
/// `DDAGENTUSER_PASSWORD`. The password is only passed alongside a name.
#[must_use]
pub fn build_install_options(request: &InstallRequest) -> Vec<InstallOption> {
    let mut options = vec![InstallOption::secret(APIKEY, request.api_key.clone())];

    if let Some(hostname) = non_blank(request.hostname.as_deref()) {
        options.push(InstallOption::plain(HOSTNAME, hostname));
    }

    if request.tags.iter().any(|t| !t.trim().is_empty()) {
        options.push(InstallOption::plain(TAGS, quote_tags(&request.tags)));
    }

    if request.npm_enabled {
        options.push(InstallOption::plain(ADDLOCAL, NPM_FEATURES));
    }

    if let Some(name) = non_blank(request.service_account_name.as_deref()) {
        options.push(InstallOption::plain(DDAGENTUSER_NAME, name));
        if let Some(password) = request
            .service_account_password
            .as_ref()
            .filter(|p| !p.is_blank())
        {
            options.push(InstallOption::secret(DDAGENTUSER_PASSWORD, password.clone()));
        }
    }

    options
}
