//! `system/*` objects

use super::{define, name_table, switch, text};
use crate::resource::{MkeyKind, ResourceDefinition};
use fortiflow_core::Field;

/// SSH server settings, one per vdom
pub fn ssh_config() -> ResourceDefinition {
    define(
        "fortios_system_sshconfig",
        "SystemSshConfig",
        "system/ssh-config",
        MkeyKind::Singleton("SystemSshConfig"),
        vec![
            Field::string("ssh_kex_algo").optional().computed(),
            Field::string("ssh_enc_algo").optional().computed(),
            Field::string("ssh_mac_algo").optional().computed(),
            Field::string("ssh_hsk_algo").optional().computed(),
            switch("ssh_hsk_override"),
            Field::string("ssh_hsk_password").optional().sensitive(),
            Field::string("ssh_hsk").optional().sensitive(),
        ],
    )
}

/// SNMPv3 user
pub fn snmp_user() -> ResourceDefinition {
    define(
        "fortios_systemsnmp_user",
        "SystemSnmpUser",
        "system.snmp/user",
        MkeyKind::Name("name"),
        vec![
            text("name", 32).force_new(),
            switch("status"),
            switch("trap_status"),
            Field::int("trap_lport").optional().computed().int_between(1, 65535),
            Field::int("trap_rport").optional().computed().int_between(1, 65535),
            switch("queries"),
            Field::int("query_port").optional().computed().int_between(1, 65535),
            Field::string("notify_hosts").optional().computed(),
            Field::string("notify_hosts6").optional().computed(),
            Field::string("source_ip").optional().computed(),
            Field::string("source_ipv6").optional().computed(),
            switch("ha_direct"),
            Field::string("events").optional().computed(),
            text("mib_view", 32),
            name_table("vdoms", 79),
            Field::string("security_level")
                .optional()
                .computed()
                .one_of(&["no-auth-no-priv", "auth-no-priv", "auth-priv"]),
            Field::string("auth_proto")
                .optional()
                .computed()
                .one_of(&["md5", "sha", "sha224", "sha256", "sha384", "sha512"]),
            Field::string("auth_pwd")
                .optional()
                .sensitive()
                .len_between(0, 128),
            Field::string("priv_proto")
                .optional()
                .computed()
                .one_of(&["aes", "des", "aes256", "aes256cisco"]),
            Field::string("priv_pwd")
                .optional()
                .sensitive()
                .len_between(0, 128),
            Field::string("interface_select_method")
                .optional()
                .computed()
                .one_of(&["auto", "sdwan", "specify"]),
            text("interface", 15),
        ],
    )
}

/// External threat feed
pub fn external_resource() -> ResourceDefinition {
    define(
        "fortios_system_externalresource",
        "SystemExternalResource",
        "system/external-resource",
        MkeyKind::Name("name"),
        vec![
            text("name", 35).force_new(),
            Field::string("uuid").optional().computed(),
            switch("status"),
            Field::string("type").optional().computed().one_of(&[
                "category",
                "address",
                "domain",
                "malware",
                "mac-address",
                "generic-address",
                "data",
            ]),
            text("namespace", 15),
            text("object_array_path", 511),
            Field::string("update_method")
                .optional()
                .computed()
                .one_of(&["feed", "push"]),
            Field::int("category").optional().computed().int_between(192, 221),
            text("username", 64),
            Field::string("password")
                .optional()
                .sensitive()
                .len_between(0, 128),
            switch("client_cert_auth"),
            text("client_cert", 79),
            text("comments", 255),
            Field::string("resource").required().len_between(0, 511),
            text("user_agent", 255),
            Field::string("server_identity_check")
                .optional()
                .computed()
                .one_of(&["none", "basic", "full"]),
            Field::int("refresh_rate")
                .optional()
                .computed()
                .int_between(1, 43200),
            Field::string("source_ip").optional().computed(),
            Field::string("interface_select_method")
                .optional()
                .computed()
                .one_of(&["auto", "sdwan", "specify"]),
            text("interface", 15),
        ],
    )
}
