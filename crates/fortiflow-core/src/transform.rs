//! Flatten/expand engine
//!
//! One schema-driven walker replaces the per-field conversion functions:
//! expand renames underscored schema keys to the hyphenated API keys,
//! flatten does the reverse, both recursing into tables.

use crate::data::{ResourceData, is_set};
use crate::error::{CoreError, Result};
use crate::helpers::{SortMode, convintf2i, dynamic_sort_subtable, validate_conv_ipmask_to_cidr};
use crate::schema::{Block, Field, FieldKind, ValueFormat};
use serde_json::{Map, Value};

/// Knobs read from the provider-side attributes of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    pub sort: SortMode,
    /// Refresh tables the configuration does not mention
    pub all_tables: bool,
}

impl FlattenOptions {
    pub fn from_data(data: &ResourceData) -> Self {
        Self {
            sort: SortMode::parse(data.get_str("dynamic_sort_subtable").unwrap_or("false")),
            all_tables: data.get_str("get_all_tables") == Some("true"),
        }
    }
}

/// Build the API request body from resource attributes.
///
/// Attributes that were set in the prior state but are now absent are sent
/// as `null` (or `[]` for tables) so the device clears them. Sensitive
/// attributes are left alone when absent.
pub fn expand_object(block: &Block, data: &ResourceData) -> Map<String, Value> {
    let mut obj = Map::new();
    for field in block.iter().filter(|f| f.is_sent()) {
        if let Some(value) = data.get_ok(field.name) {
            obj.insert(field.api_name.clone(), expand_value(field, value));
        } else if data.has_change(field.name) && !field.sensitive {
            obj.insert(field.api_name.clone(), field.kind.cleared_value());
        }
    }
    obj
}

/// Convert one schema value to its API form
pub fn expand_value(field: &Field, value: &Value) -> Value {
    match &field.kind {
        FieldKind::Table(block) => match value {
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| expand_entry(block, item)).collect())
            }
            other => other.clone(),
        },
        FieldKind::Int => match value {
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| value.clone()),
            other => other.clone(),
        },
        FieldKind::String | FieldKind::List => value.clone(),
    }
}

fn expand_entry(block: &Block, item: &Value) -> Value {
    let Some(entry) = item.as_object() else {
        return item.clone();
    };
    let mut out = Map::new();
    for field in block.iter().filter(|f| f.is_sent()) {
        if let Some(value) = entry.get(field.name).filter(|v| is_set(v)) {
            out.insert(field.api_name.clone(), expand_value(field, value));
        }
    }
    Value::Object(out)
}

/// Convert an API object into schema attributes.
///
/// Sensitive fields are skipped: the device only returns them encrypted.
/// Tables are skipped unless configured or `options.all_tables` is set.
pub fn flatten_object(
    block: &Block,
    api: &Map<String, Value>,
    data: &ResourceData,
    options: FlattenOptions,
) -> Map<String, Value> {
    let mut out = Map::new();
    for field in block.iter().filter(|f| !f.local && !f.sensitive) {
        let Some(value) = api.get(&field.api_name) else {
            continue;
        };
        if field.is_table() && !options.all_tables && data.get_ok(field.name).is_none() {
            continue;
        }
        out.insert(
            field.name.to_string(),
            flatten_value(field, value, data.get(field.name), options.sort),
        );
    }
    out
}

/// Convert one API value to its schema form. `current` is the value held
/// in state, consulted for ipv4-classnet fields.
pub fn flatten_value(field: &Field, value: &Value, current: Option<&Value>, sort: SortMode) -> Value {
    match &field.kind {
        FieldKind::Int => convintf2i(value),
        FieldKind::List => value.clone(),
        FieldKind::String => match field.format {
            ValueFormat::Ipv4ClassNet => validate_conv_ipmask_to_cidr(current, value),
            ValueFormat::Plain => value.clone(),
        },
        FieldKind::Table(block) => match value {
            Value::Array(items) => {
                let mut entries: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| flatten_entry(block, item, current.and_then(|c| c.get(i)), sort))
                    .collect();
                if let Some(key) = block.key() {
                    dynamic_sort_subtable(&mut entries, key, sort);
                }
                Value::Array(entries)
            }
            other => other.clone(),
        },
    }
}

fn flatten_entry(block: &Block, item: &Value, current: Option<&Value>, sort: SortMode) -> Value {
    let Some(entry) = item.as_object() else {
        return item.clone();
    };
    let mut out = Map::new();
    for field in block.iter().filter(|f| !f.local && !f.sensitive) {
        if let Some(value) = entry.get(&field.api_name) {
            let current_field = current.and_then(|c| c.get(field.name));
            out.insert(
                field.name.to_string(),
                flatten_value(field, value, current_field, sort),
            );
        }
    }
    Value::Object(out)
}

/// Whether a failed assignment of an API value may be ignored.
///
/// Values of a known JSON shape (string, number, list) that do not fit the
/// schema come from firmware differences and are skipped; anything else is
/// reported.
pub fn api_patch_tolerated(value: Option<&Value>) -> bool {
    matches!(
        value,
        Some(Value::String(_)) | Some(Value::Number(_)) | Some(Value::Array(_))
    )
}

/// Apply an API object to the resource attributes
pub fn refresh(block: &Block, api: &Map<String, Value>, data: &mut ResourceData) -> Result<()> {
    let options = FlattenOptions::from_data(data);
    refresh_with(block, api, data, options)
}

pub fn refresh_with(
    block: &Block,
    api: &Map<String, Value>,
    data: &mut ResourceData,
    options: FlattenOptions,
) -> Result<()> {
    let flattened = flatten_object(block, api, data, options);
    for (name, value) in flattened {
        let Some(field) = block.field(&name) else {
            continue;
        };
        if let Err(e) = data.set(field, value) {
            if api_patch_tolerated(api.get(&field.api_name)) {
                tracing::debug!("Skipping {}: {}", name, e);
                continue;
            }
            return Err(CoreError::Read {
                field: name,
                message: e.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block() -> Block {
        Block::new(vec![
            Field::string("name").optional().computed(),
            Field::string("uuid").computed(),
            Field::string("comment").optional(),
            Field::int("color").optional().computed(),
            Field::string("dst").ipv4_classnet().optional().computed(),
            Field::string("password").sensitive().optional(),
            Field::table("member", Block::new(vec![Field::string("name").optional()])).optional(),
            Field::table(
                "tagging",
                Block::new(vec![
                    Field::string("name").optional(),
                    Field::string("category").optional(),
                    Field::table("tags", Block::new(vec![Field::string("name").optional()]))
                        .optional(),
                ]),
            )
            .optional(),
            Field::int("fosid").api_name("id").optional().computed(),
            Field::string("vdomparam").optional().local(),
            Field::string("dynamic_sort_subtable").optional().local(),
            Field::string("get_all_tables").optional().local(),
        ])
    }

    fn data(value: Value) -> ResourceData {
        ResourceData::from_config(value.as_object().unwrap().clone())
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_expand_renames_and_skips_local_and_computed() {
        let d = data(json!({
            "name": "grp",
            "uuid": "abc",
            "fosid": 7,
            "comment": "",
            "vdomparam": "root",
            "member": [{"name": "a"}],
            "tagging": [{"name": "t", "category": "c", "tags": [{"name": "x"}]}],
        }));
        let obj = expand_object(&block(), &d);
        assert_eq!(
            Value::Object(obj),
            json!({
                "name": "grp",
                "id": 7,
                "member": [{"name": "a"}],
                "tagging": [{"name": "t", "category": "c", "tags": [{"name": "x"}]}],
            })
        );
    }

    #[test]
    fn test_expand_clears_removed_fields() {
        let prior = map(json!({"comment": "old", "member": [{"name": "a"}], "name": "grp"}));
        let d = data(json!({"name": "grp"})).with_prior(prior);
        let obj = expand_object(&block(), &d);
        assert_eq!(obj.get("comment"), Some(&Value::Null));
        assert_eq!(obj.get("member"), Some(&json!([])));
        assert_eq!(obj.get("name"), Some(&json!("grp")));
    }

    #[test]
    fn test_expand_keeps_removed_sensitive_fields() {
        let prior = map(json!({"name": "grp", "password": "secret", "comment": "old"}));
        let d = data(json!({"name": "grp", "comment": "new"})).with_prior(prior);
        let obj = expand_object(&block(), &d);
        assert_eq!(
            Value::Object(obj),
            json!({"name": "grp", "comment": "new"})
        );
    }

    #[test]
    fn test_flatten_renames_and_coerces() {
        let d = data(json!({"member": [{"name": "b"}], "dst": "10.0.0.0/8"}));
        let api = map(json!({
            "name": "grp",
            "q_origin_key": "grp",
            "color": "3",
            "id": 12,
            "dst": "10.0.0.0 255.0.0.0",
            "password": "ENC xyz",
            "member": [{"name": "b", "q_origin_key": "b"}, {"name": "a"}],
            "tagging": [{"name": "t"}],
        }));
        let out = flatten_object(&block(), &api, &d, FlattenOptions::default());
        assert_eq!(
            Value::Object(out),
            json!({
                "name": "grp",
                "color": 3,
                "fosid": 12,
                "dst": "10.0.0.0/8",
                "member": [{"name": "b"}, {"name": "a"}],
            })
        );
    }

    #[test]
    fn test_flatten_all_tables_and_sort() {
        let d = data(json!({"dynamic_sort_subtable": "true", "get_all_tables": "true"}));
        let api = map(json!({
            "member": [{"name": "b"}, {"name": "a"}],
            "tagging": [{"name": "t2", "tags": [{"name": "z"}, {"name": "y"}]}, {"name": "t1"}],
        }));
        let out = flatten_object(&block(), &api, &d, FlattenOptions::from_data(&d));
        assert_eq!(out["member"], json!([{"name": "a"}, {"name": "b"}]));
        assert_eq!(
            out["tagging"],
            json!([{"name": "t1"}, {"name": "t2", "tags": [{"name": "y"}, {"name": "z"}]}])
        );
    }

    #[test]
    fn test_scalar_round_trip() {
        let b = block();
        for (name, value) in [
            ("name", json!("grp-1")),
            ("comment", json!("hello world")),
            ("color", json!(17)),
            ("fosid", json!(0)),
            ("dst", json!("192.168.0.0 255.255.0.0")),
        ] {
            let field = b.field(name).unwrap();
            let expanded = expand_value(field, &value);
            assert_eq!(flatten_value(field, &expanded, Some(&value), SortMode::Off), value);
        }
    }

    #[test]
    fn test_table_round_trip_preserves_entries() {
        let b = block();
        let field = b.field("tagging").unwrap();
        let value = json!([
            {"name": "t2", "category": "c", "tags": [{"name": "x"}, {"name": "w"}]},
            {"name": "t1", "category": "d", "tags": []},
        ]);
        let back = flatten_value(field, &expand_value(field, &value), None, SortMode::Natural);
        let back = back.as_array().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0]["name"], "t1");
        assert_eq!(back[1]["tags"], json!([{"name": "w"}, {"name": "x"}]));
    }

    #[test]
    fn test_refresh_tolerates_known_shapes() {
        let b = Block::new(vec![
            Field::table("member", Block::new(vec![Field::string("name").optional()])).optional(),
            Field::string("comment").optional(),
        ]);
        let mut d = data(json!({"member": [{"name": "a"}], "comment": "keep"}));

        // list of strings does not fit a table but is a known API shape
        let api = map(json!({"member": ["a"], "comment": "new"}));
        refresh(&b, &api, &mut d).unwrap();
        assert_eq!(d.get("member"), Some(&json!([{"name": "a"}])));
        assert_eq!(d.get_str("comment"), Some("new"));

        let api = map(json!({"comment": {"unexpected": true}}));
        let err = refresh(&b, &api, &mut d).unwrap_err();
        assert!(err.to_string().starts_with("Error reading comment"));
    }

    #[test]
    fn test_api_patch_tolerated() {
        assert!(api_patch_tolerated(Some(&json!("x"))));
        assert!(api_patch_tolerated(Some(&json!(1.5))));
        assert!(api_patch_tolerated(Some(&json!([]))));
        assert!(!api_patch_tolerated(Some(&json!(null))));
        assert!(!api_patch_tolerated(Some(&json!({}))));
        assert!(!api_patch_tolerated(None));
    }
}
