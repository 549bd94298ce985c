//! Per-resource attribute storage

use crate::error::{CoreError, Result};
use crate::schema::{Field, FieldKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attributes of one resource instance plus its ID.
///
/// An empty ID means the object does not exist (any more); handlers clear
/// the ID instead of failing when the device reports the object missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    id: String,
    attributes: Map<String, Value>,
    /// Attributes as last recorded in state, used by `has_change`
    #[serde(skip)]
    prior: Option<Map<String, Value>>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a configuration body
    pub fn from_config(config: Map<String, Value>) -> Self {
        Self {
            attributes: config,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Record the attributes the change is computed against
    pub fn with_prior(mut self, prior: Map<String, Value>) -> Self {
        self.prior = Some(prior);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }

    /// Value of an attribute, `None` when absent or null
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Like `get`, but empty strings and empty lists count as unset.
    /// Numbers (including 0) and booleans are always set.
    pub fn get_ok(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| is_set(v))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// The `vdomparam` attribute, empty when the provider default applies
    pub fn vdomparam(&self) -> &str {
        self.get_str("vdomparam").unwrap_or("")
    }

    /// Type-checked assignment. `null` removes the attribute.
    pub fn set(&mut self, field: &Field, value: Value) -> Result<()> {
        if value.is_null() {
            self.attributes.remove(field.name);
            return Ok(());
        }
        check_kind(field, &value)?;
        self.attributes.insert(field.name.to_string(), value);
        Ok(())
    }

    /// Unchecked assignment for provider-managed attributes
    pub fn set_raw(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Whether the attribute differs from the prior state. Without a prior
    /// state every set attribute counts as changed.
    pub fn has_change(&self, name: &str) -> bool {
        let current = self.get_ok(name);
        match &self.prior {
            Some(prior) => current != prior.get(name).filter(|v| is_set(v)),
            None => current.is_some(),
        }
    }
}

/// Non-null, non-empty value
pub fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn check_kind(field: &Field, value: &Value) -> Result<()> {
    let ok = match &field.kind {
        FieldKind::String => value.is_string(),
        FieldKind::Int => value.is_i64() || value.is_u64(),
        FieldKind::List => value
            .as_array()
            .is_some_and(|items| items.iter().all(|i| i.is_string() || i.is_number())),
        FieldKind::Table(_) => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_object)),
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::TypeMismatch {
            field: field.name.to_string(),
            expected: field.kind.type_name(),
            got: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Block;
    use serde_json::json;

    fn data(value: Value) -> ResourceData {
        ResourceData::from_config(value.as_object().unwrap().clone())
    }

    #[test]
    fn test_get_ok_semantics() {
        let d = data(json!({
            "name": "web",
            "comment": "",
            "color": 0,
            "member": [],
            "uuid": null,
        }));
        assert_eq!(d.get_ok("name"), Some(&json!("web")));
        assert_eq!(d.get_ok("comment"), None);
        assert_eq!(d.get("comment"), Some(&json!("")));
        assert_eq!(d.get_ok("color"), Some(&json!(0)));
        assert_eq!(d.get_ok("member"), None);
        assert_eq!(d.get("uuid"), None);
    }

    #[test]
    fn test_set_is_type_checked() {
        let mut d = ResourceData::new();
        let name = Field::string("name");
        let member = Field::table("member", Block::new(vec![Field::string("name")]));

        d.set(&name, json!("grp")).unwrap();
        assert!(d.set(&name, json!(1)).is_err());
        assert!(d.set(&member, json!("x")).is_err());
        assert!(d.set(&member, json!([1, 2])).is_err());
        d.set(&member, json!([{"name": "a"}])).unwrap();

        d.set(&name, Value::Null).unwrap();
        assert!(d.get("name").is_none());
        assert_eq!(d.get("member"), Some(&json!([{"name": "a"}])));
    }

    #[test]
    fn test_has_change_against_prior() {
        let prior = json!({"comment": "old", "color": 1}).as_object().unwrap().clone();
        let d = data(json!({"comment": "old", "color": 2, "exclude": "enable"})).with_prior(prior);
        assert!(!d.has_change("comment"));
        assert!(d.has_change("color"));
        assert!(d.has_change("exclude"));
        assert!(!d.has_change("missing"));

        let removed = data(json!({})).with_prior(
            json!({"comment": "old"}).as_object().unwrap().clone(),
        );
        assert!(removed.has_change("comment"));
    }

    #[test]
    fn test_id_lifecycle() {
        let mut d = ResourceData::new().with_id("grp1");
        assert_eq!(d.id(), "grp1");
        assert!(!d.is_gone());
        d.clear_id();
        assert!(d.is_gone());
        assert_eq!(d.vdomparam(), "");
    }
}
