//! KDL desired-state parser
//!
//! ```kdl
//! provider {
//!     hostname "192.168.1.99"
//!     vdom "root"
//! }
//!
//! resource "fortios_firewall_addrgrp" "web" {
//!     name "web-servers"
//!     member { name "srv-1"; }
//!     member name="srv-2"
//! }
//!
//! data "fortios_system_sshconfig" "current" {}
//! ```
//!
//! A child node with a single argument is a scalar attribute. A child with a
//! children block, or with only properties, appends one entry to a table.

#[cfg(test)]
mod tests;

use crate::error::{CoreError, Result};
use crate::model::{DesiredState, ProviderBlock, ResourceConfig};
use kdl::{KdlDocument, KdlNode, KdlValue};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a desired-state file
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<DesiredState> {
    let content = fs::read_to_string(path.as_ref())?;
    tracing::debug!("Parsing {}", path.as_ref().display());
    parse_kdl_string(&content)
}

/// Parse desired-state text
pub fn parse_kdl_string(content: &str) -> Result<DesiredState> {
    let doc: KdlDocument = content.parse()?;

    let mut state = DesiredState::default();
    let mut seen_resources = HashSet::new();
    let mut seen_data = HashSet::new();
    let mut provider_seen = false;

    for node in doc.nodes() {
        match node.name().value() {
            "provider" => {
                if provider_seen {
                    return Err(CoreError::Duplicate {
                        kind: "provider",
                        address: "provider".to_string(),
                    });
                }
                provider_seen = true;
                state.provider = parse_provider(node)?;
            }
            "resource" => {
                let resource = parse_block(node, "resource")?;
                if !seen_resources.insert(resource.address()) {
                    return Err(CoreError::Duplicate {
                        kind: "resource",
                        address: resource.address(),
                    });
                }
                state.resources.push(resource);
            }
            "data" => {
                let data = parse_block(node, "data")?;
                if !seen_data.insert(data.address()) {
                    return Err(CoreError::Duplicate {
                        kind: "data source",
                        address: data.address(),
                    });
                }
                state.data_sources.push(data);
            }
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unknown top-level node: {}",
                    other
                )));
            }
        }
    }

    tracing::debug!(
        "Parsed {} resources and {} data sources",
        state.resources.len(),
        state.data_sources.len()
    );
    Ok(state)
}

fn parse_provider(node: &KdlNode) -> Result<ProviderBlock> {
    let mut provider = ProviderBlock::default();

    let Some(children) = node.children() else {
        return Ok(provider);
    };

    for child in children.nodes() {
        let key = child.name().value();
        let value = first_argument(child);
        match key {
            "hostname" => provider.hostname = value.and_then(|v| v.as_string()).map(String::from),
            "token" => provider.token = value.and_then(|v| v.as_string()).map(String::from),
            "cabundle_file" | "cabundlefile" => {
                provider.cabundle_file = value.and_then(|v| v.as_string()).map(String::from)
            }
            "vdom" => provider.vdom = value.and_then(|v| v.as_string()).map(String::from),
            "http_proxy" => {
                provider.http_proxy = value.and_then(|v| v.as_string()).map(String::from)
            }
            "insecure" => {
                provider.insecure = value.and_then(|v| {
                    v.as_bool().or_else(|| match v.as_string() {
                        Some("true") => Some(true),
                        Some("false") => Some(false),
                        _ => None,
                    })
                });
                if provider.insecure.is_none() {
                    return Err(CoreError::InvalidConfig(
                        "provider.insecure must be a boolean".to_string(),
                    ));
                }
            }
            "retries" => {
                provider.retries = value
                    .and_then(|v| v.as_integer())
                    .and_then(|v| u32::try_from(v).ok());
                if provider.retries.is_none() {
                    return Err(CoreError::InvalidConfig(
                        "provider.retries must be a non-negative integer".to_string(),
                    ));
                }
            }
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unknown provider setting: {}",
                    other
                )));
            }
        }
    }

    Ok(provider)
}

/// `resource "<type>" "<label>" { ... }`
fn parse_block(node: &KdlNode, kind: &str) -> Result<ResourceConfig> {
    let args: Vec<&str> = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .collect();

    let [resource_type, label] = args.as_slice() else {
        return Err(CoreError::InvalidConfig(format!(
            "{} requires a type and a name, e.g. {} \"fortios_firewall_addrgrp\" \"web\"",
            kind, kind
        )));
    };

    let config = match node.children() {
        Some(children) => parse_body(children, &format!("{}.{}", resource_type, label))?,
        None => Map::new(),
    };

    Ok(ResourceConfig::new(*resource_type, *label, config))
}

fn parse_body(doc: &KdlDocument, path: &str) -> Result<Map<String, Value>> {
    let mut body = Map::new();

    for child in doc.nodes() {
        let name = child.name().value().to_string();
        let child_path = format!("{}.{}", path, name);

        let properties: Vec<(&str, &KdlValue)> = child
            .entries()
            .iter()
            .filter_map(|e| e.name().map(|n| (n.value(), e.value())))
            .collect();
        let arguments: Vec<&KdlValue> = child
            .entries()
            .iter()
            .filter(|e| e.name().is_none())
            .map(|e| e.value())
            .collect();

        let is_entry = child.children().is_some() || (!properties.is_empty() && arguments.is_empty());

        if is_entry {
            let mut entry = Map::new();
            for (key, value) in properties {
                entry.insert(key.to_string(), kdl_to_json(value));
            }
            if let Some(children) = child.children() {
                for (key, value) in parse_body(children, &child_path)? {
                    if entry.insert(key.clone(), value).is_some() {
                        return Err(CoreError::InvalidConfig(format!(
                            "{}: attribute \"{}\" given twice",
                            child_path, key
                        )));
                    }
                }
            }
            match body
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(Value::Object(entry)),
                _ => {
                    return Err(CoreError::InvalidConfig(format!(
                        "{}: mixes a value and table entries",
                        child_path
                    )));
                }
            }
            continue;
        }

        let value = match (arguments.as_slice(), properties.is_empty()) {
            ([value], true) => kdl_to_json(value),
            _ => {
                return Err(CoreError::InvalidConfig(format!(
                    "{}: expected exactly one value",
                    child_path
                )));
            }
        };

        if body.contains_key(&name) {
            return Err(CoreError::InvalidConfig(format!(
                "{}: attribute given twice",
                child_path
            )));
        }
        body.insert(name, value);
    }

    Ok(body)
}

fn first_argument(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .map(|e| e.value())
}

fn kdl_to_json(value: &KdlValue) -> Value {
    if let Some(s) = value.as_string() {
        Value::String(s.to_string())
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string()))
    } else if let Some(f) = value.as_float() {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else {
        Value::Null
    }
}
