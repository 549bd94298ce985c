//! Desired-state model produced by the parser

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `provider { ... }` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBlock {
    pub hostname: Option<String>,
    pub token: Option<String>,
    pub insecure: Option<bool>,
    pub cabundle_file: Option<String>,
    pub vdom: Option<String>,
    pub http_proxy: Option<String>,
    pub retries: Option<u32>,
}

/// One `resource` or `data` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "fortios_firewall_addrgrp")
    pub resource_type: String,

    /// Local name of the block
    pub label: String,

    /// Attribute values, underscored keys
    pub config: Map<String, Value>,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        label: impl Into<String>,
        config: Map<String, Value>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            label: label.into(),
            config,
        }
    }

    /// Address used in state and output (`type.label`)
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.label)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }
}

/// Parsed `fortiflow.kdl`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    pub provider: ProviderBlock,
    pub resources: Vec<ResourceConfig>,
    pub data_sources: Vec<ResourceConfig>,
}

impl DesiredState {
    pub fn resource(&self, address: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.address() == address)
    }

    pub fn data_source(&self, address: &str) -> Option<&ResourceConfig> {
        self.data_sources.iter().find(|r| r.address() == address)
    }
}
