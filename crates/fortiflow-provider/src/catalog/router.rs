//! `router/*` objects

use super::{define, name_table, switch, text};
use crate::resource::{MkeyKind, ResourceDefinition};
use fortiflow_core::Field;

/// IPv4 static route, keyed by a sequence number the device assigns when
/// none is given
pub fn static_route() -> ResourceDefinition {
    define(
        "fortios_router_static",
        "RouterStatic",
        "router/static",
        MkeyKind::Integer("seq_num"),
        vec![
            Field::int("seq_num")
                .optional()
                .computed()
                .int_between(0, 4294967295),
            switch("status"),
            Field::string("dst").optional().computed().ipv4_classnet(),
            Field::string("src").optional().computed().ipv4_classnet(),
            Field::string("gateway").optional().computed(),
            Field::int("distance").optional().computed().int_between(1, 255),
            Field::int("weight").optional().computed().int_between(0, 255),
            Field::int("priority")
                .optional()
                .computed()
                .int_between(0, 65535),
            text("device", 35),
            text("comment", 255),
            switch("blackhole"),
            switch("dynamic_gateway"),
            name_table("sdwan_zone", 35),
            text("dstaddr", 79),
            Field::int("internet_service").optional().computed(),
            switch("link_monitor_exempt"),
            Field::int("vrf").optional().computed().int_between(0, 251),
            switch("bfd"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_route_ranges() {
        let schema = static_route().schema;

        let ok = json!({"dst": "10.0.0.0/8", "distance": 10, "weight": 0, "priority": 65535});
        assert!(schema.validate(ok.as_object().unwrap()).is_empty());

        let bad = json!({"distance": 0, "weight": 256, "priority": 65536});
        let diags = schema.validate(bad.as_object().unwrap());
        assert_eq!(diags.len(), 3);
        assert!(diags.iter().any(|d| d.message
            == "expected distance to be in the range (1 - 255), got 0"));
    }
}
