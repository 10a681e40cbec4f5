//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod blacklist;
pub mod config;
pub mod error;
pub mod metrics;
pub mod options;
pub mod request;
pub mod secret;

pub use artifact::{ArtifactLocation, VersionMarker};
pub use config::{InstallerConfig, InstallerDefaults};
pub use error::{ConfigError, InstallError};
pub use options::{InstallOption, OptionValue, build_install_options};
pub use request::{DesiredState, InstallRequest, InstalledPackage};
pub use secret::Secret;
