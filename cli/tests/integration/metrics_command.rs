//! `metrics render`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::cli_tests::installer;

#[test]
fn test_metrics_render_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    installer()
        .env("DDAGENT_INSTALLER_CONFIG", dir.path().join("absent.yaml"))
        .args(["metrics", "render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is_jmx: true"))
        .stdout(predicate::str::contains("Catalina"))
        .stdout(predicate::str::contains("port: 9012"));
}

#[test]
fn test_metrics_render_to_file_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("conf.d").join("tomcat.d").join("conf.yaml");

    let first = installer()
        .env("DDAGENT_INSTALLER_CONFIG", dir.path().join("absent.yaml"))
        .args(["metrics", "render", "--json", "--output"])
        .arg(&target)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&first).expect("json");
    assert_eq!(v["changed"], true);
    let written = std::fs::read_to_string(&target).expect("written");
    assert!(written.contains("init_config"));

    let second = installer()
        .env("DDAGENT_INSTALLER_CONFIG", dir.path().join("absent.yaml"))
        .args(["metrics", "render", "--json", "--output"])
        .arg(&target)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&second).expect("json");
    assert_eq!(v["changed"], false);
}

#[test]
fn test_metrics_render_uses_configured_jmx_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "jmx:\n  host: tomcat.local\n  port: 9999\n").expect("write");

    installer()
        .arg("--config")
        .arg(&path)
        .args(["metrics", "render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("host: tomcat.local"))
        .stdout(predicate::str::contains("port: 9999"));
}
