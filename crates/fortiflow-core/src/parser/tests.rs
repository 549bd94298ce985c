use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_parse_provider() {
    let state = parse_kdl_string(
        r#"
provider {
    hostname "192.168.52.177"
    insecure #true
    vdom "root"
    retries 2
}
"#,
    )
    .unwrap();

    assert_eq!(state.provider.hostname.as_deref(), Some("192.168.52.177"));
    assert_eq!(state.provider.insecure, Some(true));
    assert_eq!(state.provider.vdom.as_deref(), Some("root"));
    assert_eq!(state.provider.retries, Some(2));
    assert_eq!(state.provider.token, None);
}

#[test]
fn test_parse_resource_with_tables() {
    let state = parse_kdl_string(
        r#"
resource "fortios_firewall_addrgrp" "web" {
    name "web-servers"
    color 3
    member { name "srv-1"; }
    member name="srv-2"
    tagging {
        name "env"
        tags { name "prod"; }
        tags { name "dmz"; }
    }
}
"#,
    )
    .unwrap();

    assert_eq!(state.resources.len(), 1);
    let web = &state.resources[0];
    assert_eq!(web.address(), "fortios_firewall_addrgrp.web");
    assert_eq!(
        Value::Object(web.config.clone()),
        json!({
            "name": "web-servers",
            "color": 3,
            "member": [{"name": "srv-1"}, {"name": "srv-2"}],
            "tagging": [{"name": "env", "tags": [{"name": "prod"}, {"name": "dmz"}]}],
        })
    );
}

#[test]
fn test_parse_data_sources() {
    let state = parse_kdl_string(
        r#"
data "fortios_system_sshconfig" "current" {}
data "fortios_firewall_addrgrp" "lookup" {
    name "web-servers"
}
"#,
    )
    .unwrap();

    assert!(state.resources.is_empty());
    assert_eq!(state.data_sources.len(), 2);
    assert!(state.data_sources[0].config.is_empty());
    assert_eq!(
        state
            .data_source("fortios_firewall_addrgrp.lookup")
            .and_then(|d| d.get_str("name")),
        Some("web-servers")
    );
}

#[test]
fn test_duplicate_resource_address() {
    let result = parse_kdl_string(
        r#"
resource "fortios_router_static" "default" { seq_num 1; }
resource "fortios_router_static" "default" { seq_num 2; }
"#,
    );
    assert!(matches!(result, Err(CoreError::Duplicate { kind: "resource", .. })));
}

#[test]
fn test_duplicate_scalar_attribute() {
    let result = parse_kdl_string(
        r#"
resource "fortios_firewall_addrgrp" "web" {
    name "a"
    name "b"
}
"#,
    );
    assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
}

#[test]
fn test_resource_requires_type_and_label() {
    let result = parse_kdl_string(r#"resource "fortios_firewall_addrgrp" { name "a"; }"#);
    assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
}

#[test]
fn test_unknown_top_level_node() {
    let result = parse_kdl_string(r#"service "web" {}"#);
    assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
}

#[test]
fn test_invalid_kdl() {
    let result = parse_kdl_string("resource \"x\" \"y\" {");
    assert!(matches!(result, Err(CoreError::KdlParse(_))));
}

#[test]
fn test_parse_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fortiflow.kdl");
    std::fs::write(
        &path,
        r#"resource "fortios_system_sshconfig" "ssh" { ssh_kex_algo "diffie-hellman-group14-sha256"; }"#,
    )
    .unwrap();

    let state = parse_kdl_file(&path).unwrap();
    assert_eq!(
        state.resources[0].get_str("ssh_kex_algo"),
        Some("diffie-hellman-group14-sha256")
    );
}
