#![allow(deprecated)] // TODO: migrate cargo_bin to cargo_bin_cmd!

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const VALID: &str = r#"
provider {
    hostname "192.0.2.10"
}

resource "fortios_firewall_addrgrp" "web" {
    name "web-servers"
    member { name "srv-1"; }
    color 3
}

data "fortios_system_sshconfig" "current" {}
"#;

fn fortiflow() -> Command {
    let mut cmd = Command::cargo_bin("fortiflow").unwrap();
    cmd.env_remove("FORTIFLOW_CONFIG_PATH")
        .env_remove("FORTIOS_ACCESS_HOSTNAME")
        .env_remove("FORTIOS_ACCESS_TOKEN");
    cmd
}

#[test]
fn test_cli_help() {
    fortiflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_cli_version() {
    fortiflow()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fortiflow"));
}

#[test]
fn test_apply_help() {
    fortiflow()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_invalid_command() {
    fortiflow().arg("invalid-command").assert().failure();
}

#[test]
fn test_schema_lists_types() {
    fortiflow()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("fortios_firewall_addrgrp"))
        .stdout(predicate::str::contains("fortios_router_staticlist"));
}

#[test]
fn test_schema_of_one_type() {
    fortiflow()
        .args(["schema", "fortios_router_static"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seq_num"))
        .stdout(predicate::str::contains("1-255"))
        .stdout(predicate::str::contains("vdomparam"));
}

#[test]
fn test_schema_unknown_type() {
    fortiflow()
        .args(["schema", "fortios_nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resource type"));
}

#[test]
fn test_validate_valid_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("fortiflow.kdl"), VALID).unwrap();

    fortiflow()
        .current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("fortios_firewall_addrgrp.web"))
        .stdout(predicate::str::contains("data.fortios_system_sshconfig.current"));
}

#[test]
fn test_validate_reports_problems() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("fortiflow.kdl"),
        r#"
resource "fortios_router_static" "default" {
    distance 300
    bogus "x"
}
"#,
    )
    .unwrap();

    fortiflow()
        .current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fortios_router_static.default.distance"))
        .stderr(predicate::str::contains("fortios_router_static.default.bogus"));
}

#[test]
fn test_explicit_config_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("lab.kdl");
    fs::write(&config, VALID).unwrap();

    fortiflow()
        .current_dir(std::env::temp_dir())
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn test_state_list_empty() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("fortiflow.kdl"), VALID).unwrap();

    fortiflow()
        .current_dir(temp_dir.path())
        .args(["state", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No managed resources"));
}

#[test]
fn test_state_show_masks_sensitive_values() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("fortiflow.kdl"), VALID).unwrap();
    fs::create_dir(temp_dir.path().join(".fortiflow")).unwrap();
    fs::write(
        temp_dir.path().join(".fortiflow/state.json"),
        r#"{
  "version": 1,
  "serial": 4,
  "updated_at": "2024-05-01T00:00:00Z",
  "resources": {
    "fortios_systemsnmp_user.monitor": {
      "id": "monitor",
      "resource_type": "fortios_systemsnmp_user",
      "attributes": {"name": "monitor", "auth_pwd": "hunter2"},
      "created_at": "2024-05-01T00:00:00Z",
      "updated_at": "2024-05-01T00:00:00Z"
    }
  }
}"#,
    )
    .unwrap();

    fortiflow()
        .current_dir(temp_dir.path())
        .args(["state", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fortios_systemsnmp_user.monitor"));

    fortiflow()
        .current_dir(temp_dir.path())
        .args(["state", "show", "fortios_systemsnmp_user.monitor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(sensitive)"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_plan_without_token_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("fortiflow.kdl"), VALID).unwrap();

    fortiflow()
        .current_dir(temp_dir.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FORTIOS_ACCESS_TOKEN"));
}

#[test]
fn test_validate_without_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();

    fortiflow()
        .current_dir(temp_dir.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration file found"));
}

#[test]
fn test_schema_as_json() {
    let output = fortiflow()
        .args(["schema", "fortios_firewall_shapingpolicy", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fields = schema["fields"].as_array().unwrap();
    let fosid = fields.iter().find(|f| f["name"] == "fosid").unwrap();
    assert_eq!(fosid["api_name"], "id");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_data_output_is_parseable() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "version": "v7.2.0",
            "results": {"hostname": "fw1", "model_name": "FortiGate"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/cmdb/system/ssh-config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "results": {"ssh-kex-algo": "diffie-hellman-group14-sha256"}
        })))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config = format!(
        "provider {{\n    hostname \"{}\"\n    token \"test-token\"\n}}\n\ndata \"fortios_system_sshconfig\" \"current\" {{}}\n",
        server.uri()
    );
    fs::write(temp_dir.path().join("fortiflow.kdl"), config).unwrap();

    let output = fortiflow()
        .current_dir(temp_dir.path())
        .args(["data", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Connected to fw1"));

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results[0]["address"], "data.fortios_system_sshconfig.current");
    assert_eq!(
        results[0]["attributes"]["ssh_kex_algo"],
        "diffie-hellman-group14-sha256"
    );

    let output = fortiflow()
        .current_dir(temp_dir.path())
        .args(["data", "--format", "yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(
        results[0]["address"].as_str(),
        Some("data.fortios_system_sshconfig.current")
    );
}
