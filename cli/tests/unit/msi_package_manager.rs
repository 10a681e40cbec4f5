//! Tests for `MsiPackageManager` driven through a scripted `CommandRunner`.

#![allow(clippy::expect_used)]

use std::path::Path;

use ddagent_installer::application::ports::PackageManager;
use ddagent_installer::domain::{InstallError, build_install_options};
use ddagent_installer::infra::msi::{MsiPackageManager, check_code};

use crate::helpers::{API_KEY, err_output, ok_output, package, present_request};
use crate::mocks::ScriptedRunner;

#[tokio::test]
async fn test_installed_queries_registry_by_product_name() {
    let runner = ScriptedRunner::new(vec![ok_output(
        br#"{"PSChildName":"{ABC}","DisplayName":"Datadog Agent","DisplayVersion":"7.30.0.1"}"#,
    )]);
    let pkg = MsiPackageManager::new(&runner, "Datadog Agent")
        .installed()
        .await
        .expect("query")
        .expect("installed");

    assert_eq!(pkg.version, "7.30.0.1");
    assert_eq!(pkg.product_code, "{ABC}");
    let calls = runner.calls();
    assert_eq!(calls[0].0, "powershell");
    assert!(calls[0].1.iter().any(|a| a.contains("'Datadog Agent'")));
}

#[tokio::test]
async fn test_installed_empty_output_means_absent() {
    let runner = ScriptedRunner::new(vec![ok_output(b"")]);
    let pkg = MsiPackageManager::new(&runner, "Datadog Agent")
        .installed()
        .await
        .expect("query");
    assert!(pkg.is_none());
}

#[tokio::test]
async fn test_install_passes_msiexec_a_raw_command_line() {
    let runner = ScriptedRunner::new(vec![ok_output(b"")]);
    let options = build_install_options(&present_request("7.30.0"));
    MsiPackageManager::new(&runner, "Datadog Agent")
        .install(Path::new("agent.msi"), &options)
        .await
        .expect("install");

    let (program, args) = &runner.calls()[0];
    assert_eq!(program, "msiexec");
    assert_eq!(args.len(), 1, "one verbatim command line: {args:?}");
    assert_eq!(
        args[0],
        format!(r#"/i "agent.msi" /qn /norestart APIKEY={API_KEY} HOSTNAME=web-01 TAGS="env:prod,role:web""#)
    );
}

#[test]
fn test_reboot_codes_count_as_success() {
    assert!(check_code("install", Some(3010), b"").is_ok());
    assert!(check_code("uninstall", Some(1641), b"").is_ok());
}

#[tokio::test]
async fn test_install_failure_is_typed_and_carries_stderr() {
    let runner = ScriptedRunner::new(vec![err_output(1, b"Fatal error during installation")]);
    let err = MsiPackageManager::new(&runner, "Datadog Agent")
        .install(Path::new("agent.msi"), &[])
        .await
        .expect_err("non-zero exit");

    let typed = err.downcast_ref::<InstallError>().expect("typed error");
    assert_eq!(typed.code(), "PACKAGE_OPERATION_FAILURE");
    assert!(typed.to_string().contains("Fatal error"));
}

#[tokio::test]
async fn test_uninstall_uses_product_code() {
    let runner = ScriptedRunner::new(vec![ok_output(b"")]);
    let pkg = package("7.30.0.1");
    MsiPackageManager::new(&runner, "Datadog Agent")
        .uninstall(&pkg)
        .await
        .expect("uninstall");

    let (program, args) = &runner.calls()[0];
    assert_eq!(program, "msiexec");
    assert_eq!(args, &vec!["/x".to_string(), pkg.product_code.clone(), "/quiet".to_string()]);
}
