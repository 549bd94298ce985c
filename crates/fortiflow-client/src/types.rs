//! FortiOS REST API types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// CMDB table path such as `firewall/addrgrp` or `system.snmp/user`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CmdbPath(&'static str);

impl CmdbPath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub(crate) fn segments(&self) -> impl Iterator<Item = &'static str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for CmdbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Response envelope returned by every CMDB call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub http_method: Option<String>,
    pub status: Option<String>,
    pub http_status: Option<u16>,
    pub mkey: Option<Value>,
    pub vdom: Option<String>,
    pub path: Option<String>,
    pub name: Option<String>,
    pub revision: Option<String>,
    pub results: Option<Value>,
    pub error: Option<i64>,
    pub cli_error: Option<String>,
    pub serial: Option<String>,
    pub version: Option<String>,
    pub build: Option<Value>,
}

impl ApiResponse {
    /// Key of the created or updated object. Numeric keys become strings.
    pub fn mkey_string(&self) -> Option<String> {
        match self.mkey.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    /// Objects carried in `results`. Singleton tables return one object.
    pub fn result_objects(&self) -> Vec<Map<String, Value>> {
        match &self.results {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            Some(Value::Object(obj)) => vec![obj.clone()],
            _ => Vec::new(),
        }
    }

    pub(crate) fn error_message(&self) -> Option<String> {
        if let Some(cli) = self.cli_error.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(cli.trim().to_string());
        }
        self.error.map(|code| match describe_error_code(code) {
            Some(text) => format!("{} (error {})", text, code),
            None => format!("error {}", code),
        })
    }
}

/// Text for the FortiOS error codes seen most often
fn describe_error_code(code: i64) -> Option<&'static str> {
    Some(match code {
        -1 => "invalid length of value",
        -3 => "entry not found",
        -5 => "a duplicate entry already exists",
        -23 => "entry is used by other objects",
        -37 => "permission denied",
        _ => return None,
    })
}

/// `monitor/system/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub hostname: Option<String>,
    pub model: Option<String>,
    pub model_name: Option<String>,
    pub serial: Option<String>,
    pub version: Option<String>,
    pub build: Option<i64>,
}

impl SystemStatus {
    pub(crate) fn from_response(response: &ApiResponse) -> Self {
        let results = response.results.as_ref().and_then(Value::as_object);
        let text = |key: &str| {
            results
                .and_then(|r| r.get(key))
                .and_then(Value::as_str)
                .map(String::from)
        };
        Self {
            hostname: text("hostname"),
            model: text("model"),
            model_name: text("model_name"),
            serial: response.serial.clone(),
            version: response.version.clone(),
            build: response.build.as_ref().and_then(|b| match b {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mkey_string() {
        let resp: ApiResponse = serde_json::from_value(json!({"mkey": "web"})).unwrap();
        assert_eq!(resp.mkey_string(), Some("web".to_string()));

        let resp: ApiResponse = serde_json::from_value(json!({"mkey": 12})).unwrap();
        assert_eq!(resp.mkey_string(), Some("12".to_string()));

        let resp: ApiResponse = serde_json::from_value(json!({"mkey": ""})).unwrap();
        assert_eq!(resp.mkey_string(), None);
    }

    #[test]
    fn test_result_objects() {
        let resp: ApiResponse =
            serde_json::from_value(json!({"results": [{"name": "a"}, {"name": "b"}]})).unwrap();
        assert_eq!(resp.result_objects().len(), 2);

        let resp: ApiResponse =
            serde_json::from_value(json!({"results": {"ssh-kex-algo": "x"}})).unwrap();
        assert_eq!(resp.result_objects().len(), 1);
    }

    #[test]
    fn test_error_message_prefers_cli_error() {
        let resp: ApiResponse = serde_json::from_value(json!({
            "status": "error",
            "error": -5,
            "cli_error": "entry already exists\n"
        }))
        .unwrap();
        assert_eq!(resp.error_message().as_deref(), Some("entry already exists"));

        let resp: ApiResponse =
            serde_json::from_value(json!({"status": "error", "error": -5})).unwrap();
        assert_eq!(
            resp.error_message().as_deref(),
            Some("a duplicate entry already exists (error -5)")
        );
    }

    #[test]
    fn test_cmdb_path_segments() {
        let path = CmdbPath::new("system.snmp/user");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["system.snmp", "user"]);
        assert_eq!(path.to_string(), "system.snmp/user");
    }
}
