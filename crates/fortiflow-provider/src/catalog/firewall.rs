//! `firewall/*` objects

use super::{define, name_table, switch, text};
use crate::resource::{MkeyKind, ResourceDefinition};
use fortiflow_core::{Block, Field};

/// IPv4 address group
pub fn addrgrp() -> ResourceDefinition {
    define(
        "fortios_firewall_addrgrp",
        "FirewallAddrgrp",
        "firewall/addrgrp",
        MkeyKind::Name("name"),
        vec![
            text("name", 79),
            Field::string("type")
                .optional()
                .computed()
                .one_of(&["default", "folder"]),
            Field::string("category")
                .optional()
                .computed()
                .one_of(&["default", "ztna-ems-tag", "ztna-geo-tag"]),
            Field::string("uuid").optional().computed(),
            name_table("member", 79),
            text("comment", 255),
            switch("exclude"),
            name_table("exclude_member", 79),
            Field::int("color").optional().computed().int_between(0, 32),
            tagging(),
            switch("allow_routing"),
            switch("fabric_object"),
        ],
    )
}

/// IPv4 address
pub fn address() -> ResourceDefinition {
    define(
        "fortios_firewall_address",
        "FirewallAddress",
        "firewall/address",
        MkeyKind::Name("name"),
        vec![
            text("name", 79),
            Field::string("uuid").optional().computed(),
            Field::string("type").optional().computed().one_of(&[
                "ipmask",
                "iprange",
                "fqdn",
                "geography",
                "wildcard",
                "dynamic",
                "interface-subnet",
                "mac",
                "route-tag",
            ]),
            Field::string("subnet").optional().computed().ipv4_classnet(),
            Field::string("start_ip").optional().computed(),
            Field::string("end_ip").optional().computed(),
            text("fqdn", 255),
            text("country", 2),
            Field::string("wildcard").optional().computed(),
            text("associated_interface", 35),
            Field::int("color").optional().computed().int_between(0, 32),
            text("comment", 255),
            switch("visibility"),
            switch("allow_routing"),
            tagging(),
        ],
    )
}

/// Traffic shaping policy. The device key `id` is `fosid` here.
pub fn shaping_policy() -> ResourceDefinition {
    define(
        "fortios_firewall_shapingpolicy",
        "FirewallShapingPolicy",
        "firewall/shaping-policy",
        MkeyKind::Integer("fosid"),
        vec![
            Field::int("fosid")
                .optional()
                .computed()
                .api_name("id")
                .int_between(0, 4294967295),
            text("name", 35),
            Field::string("uuid").optional().computed(),
            switch("status"),
            Field::string("ip_version")
                .optional()
                .computed()
                .one_of(&["4", "6"]),
            Field::string("traffic_type")
                .optional()
                .computed()
                .one_of(&["forwarding", "local-in", "local-out"]),
            name_table("srcaddr", 79),
            name_table("dstaddr", 79),
            name_table("service", 79),
            name_table("srcintf", 79),
            name_table("dstintf", 79),
            name_table("users", 79),
            name_table("groups", 79),
            text("schedule", 35),
            text("traffic_shaper", 35),
            text("traffic_shaper_reverse", 35),
            text("per_ip_shaper", 35),
            Field::int("class_id")
                .optional()
                .computed()
                .int_between(0, 4294967295),
            switch("diffserv_forward"),
            Field::string("diffservcode_forward").optional().computed(),
            Field::string("tos").optional().computed(),
            Field::string("tos_mask").optional().computed(),
            switch("tos_negate"),
            text("comment", 1023),
        ],
    )
}

fn tagging() -> Field {
    Field::table(
        "tagging",
        Block::new(vec![
            Field::string("name").optional().computed().len_between(0, 63),
            Field::string("category")
                .optional()
                .computed()
                .len_between(0, 63),
            Field::table(
                "tags",
                Block::new(vec![Field::string("name").optional().len_between(0, 79)]),
            )
            .optional(),
        ]),
    )
    .optional()
}
