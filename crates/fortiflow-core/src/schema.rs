//! Schema model for FortiOS objects
//!
//! A resource schema is a [`Block`] of [`Field`]s. Tables (FortiOS list
//! attributes such as `member`) are fields whose kind carries a nested
//! block, so the same walker handles every nesting level.

use serde::Serialize;
use serde_json::{Map, Value};

/// Value type of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Int,
    /// List of scalars (the `*list` data sources)
    List,
    /// List of sub-objects
    Table(Block),
}

impl FieldKind {
    /// Human readable type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::List => "list",
            FieldKind::Table(_) => "list of objects",
        }
    }

    /// The value sent to the API to clear a field that was removed from config
    pub fn cleared_value(&self) -> Value {
        match self {
            FieldKind::List | FieldKind::Table(_) => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }
}

/// Special value representations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    #[default]
    Plain,
    /// `a.b.c.d m.m.m.m` on the device, CIDR accepted in config
    Ipv4ClassNet,
}

impl ValueFormat {
    fn is_plain(&self) -> bool {
        *self == ValueFormat::Plain
    }
}

/// Value constraint checked during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    StringLenBetween { min: usize, max: usize },
    IntBetween { min: i64, max: i64 },
    StringInSlice { values: &'static [&'static str] },
}

impl Validator {
    /// Check a single scalar value. The error message names the field.
    pub fn check(&self, name: &str, value: &Value) -> Result<(), String> {
        match self {
            Validator::StringLenBetween { min, max } => {
                let Some(s) = value.as_str() else {
                    return Err(format!("expected type of {} to be string", name));
                };
                let len = s.chars().count();
                if len < *min || len > *max {
                    return Err(format!(
                        "expected length of {} to be in the range ({} - {}), got {}",
                        name, min, max, s
                    ));
                }
                Ok(())
            }
            Validator::IntBetween { min, max } => {
                let Some(v) = as_int(value) else {
                    return Err(format!("expected type of {} to be integer", name));
                };
                if v < *min || v > *max {
                    return Err(format!(
                        "expected {} to be in the range ({} - {}), got {}",
                        name, min, max, v
                    ));
                }
                Ok(())
            }
            Validator::StringInSlice { values } => {
                let Some(s) = value.as_str() else {
                    return Err(format!("expected type of {} to be string", name));
                };
                if !values.contains(&s) {
                    return Err(format!(
                        "expected {} to be one of {:?}, got {}",
                        name, values, s
                    ));
                }
                Ok(())
            }
        }
    }
}

/// One schema attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub api_name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    /// Provider-side setting, never exchanged with the device
    pub local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "ValueFormat::is_plain")]
    pub format: ValueFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            api_name: name.replace('_', "-"),
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            local: false,
            validator: None,
            max_items: None,
            format: ValueFormat::Plain,
            description: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn list(name: &'static str) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub fn table(name: &'static str, block: Block) -> Self {
        Self::new(name, FieldKind::Table(block))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Override the hyphenated API key (e.g. `fosid` is `id` on the device)
    pub fn api_name(mut self, api_name: &str) -> Self {
        self.api_name = api_name.to_string();
        self
    }

    pub fn len_between(mut self, min: usize, max: usize) -> Self {
        self.validator = Some(Validator::StringLenBetween { min, max });
        self
    }

    pub fn int_between(mut self, min: i64, max: i64) -> Self {
        self.validator = Some(Validator::IntBetween { min, max });
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.validator = Some(Validator::StringInSlice { values });
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn ipv4_classnet(mut self) -> Self {
        self.format = ValueFormat::Ipv4ClassNet;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Set only by the device, never by configuration
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// Whether expand sends this field to the device
    pub fn is_sent(&self) -> bool {
        !self.local && !self.is_computed_only()
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, FieldKind::Table(_))
    }
}

/// Ordered set of fields, the body of a resource or of a table entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub fields: Vec<Field>,
}

impl Block {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_api_name(&self, api_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.api_name == api_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Sort key for `dynamic_sort_subtable`: the first field of a table entry
    pub fn key(&self) -> Option<&'static str> {
        self.fields.first().map(|f| f.name)
    }

    /// Validate a configuration body against this block
    pub fn validate(&self, config: &Map<String, Value>) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        self.validate_into(config, "", &mut diags);
        diags
    }

    fn validate_into(&self, config: &Map<String, Value>, prefix: &str, diags: &mut Vec<Diagnostic>) {
        for (name, value) in config {
            let path = join_path(prefix, name);
            let Some(field) = self.field(name) else {
                diags.push(Diagnostic::new(path, "unsupported argument"));
                continue;
            };
            if value.is_null() {
                continue;
            }
            if field.is_computed_only() {
                diags.push(Diagnostic::new(path, "value is computed and cannot be set"));
                continue;
            }
            match &field.kind {
                FieldKind::String => {
                    if !value.is_string() {
                        diags.push(Diagnostic::type_mismatch(path, field, value));
                        continue;
                    }
                }
                FieldKind::Int => {
                    if as_int(value).is_none() {
                        diags.push(Diagnostic::type_mismatch(path, field, value));
                        continue;
                    }
                }
                FieldKind::List => {
                    let scalars = value
                        .as_array()
                        .is_some_and(|items| items.iter().all(|i| i.is_string() || i.is_number()));
                    if !scalars {
                        diags.push(Diagnostic::type_mismatch(path, field, value));
                    }
                    continue;
                }
                FieldKind::Table(block) => {
                    let Some(items) = value.as_array() else {
                        diags.push(Diagnostic::type_mismatch(path, field, value));
                        continue;
                    };
                    if let Some(max) = field.max_items.filter(|max| items.len() > *max) {
                        diags.push(Diagnostic::new(
                            path.clone(),
                            format!("at most {} items allowed, got {}", max, items.len()),
                        ));
                    }
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{}.{}", path, i);
                        match item.as_object() {
                            Some(entry) => block.validate_into(entry, &item_path, diags),
                            None => diags.push(Diagnostic::new(item_path, "expected an object")),
                        }
                    }
                    continue;
                }
            }
            if let Some(validator) = &field.validator {
                if let Err(message) = validator.check(name, value) {
                    diags.push(Diagnostic::new(path, message));
                }
            }
        }

        for field in self.fields.iter().filter(|f| f.required) {
            if config.get(field.name).is_none_or(Value::is_null) {
                diags.push(Diagnostic::new(
                    join_path(prefix, field.name),
                    "required argument is missing",
                ));
            }
        }
    }
}

/// A validation finding, addressed by dotted attribute path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn type_mismatch(path: String, field: &Field, value: &Value) -> Self {
        Self::new(
            path,
            format!("expected {}, got {}", field.kind.type_name(), value),
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Integer view of a value, accepting numeric strings
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn addrgrp_like() -> Block {
        Block::new(vec![
            Field::string("name").len_between(0, 79).optional().computed(),
            Field::string("uuid").computed(),
            Field::int("color").int_between(0, 32).optional().computed(),
            Field::string("exclude").one_of(&["enable", "disable"]).optional(),
            Field::table(
                "member",
                Block::new(vec![Field::string("name").len_between(0, 79).optional()]),
            )
            .optional(),
            Field::int("category").int_between(192, 221).required(),
        ])
    }

    fn config(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_api_name_defaults_to_hyphenated() {
        let field = Field::string("ssh_kex_algo");
        assert_eq!(field.api_name, "ssh-kex-algo");

        let field = Field::int("fosid").api_name("id");
        assert_eq!(field.api_name, "id");
    }

    #[test]
    fn test_valid_config_has_no_diagnostics() {
        let diags = addrgrp_like().validate(&config(json!({
            "name": "web",
            "color": 3,
            "category": 192,
            "member": [{"name": "srv1"}, {"name": "srv2"}],
        })));
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_int_out_of_range_rejected() {
        let block = addrgrp_like();
        for bad in [191, 222] {
            let diags = block.validate(&config(json!({ "category": bad })));
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].path, "category");
            assert!(diags[0].message.contains("(192 - 221)"));
        }
        for good in [192, 221] {
            assert!(block.validate(&config(json!({ "category": good }))).is_empty());
        }
    }

    #[test]
    fn test_string_length_counted_in_chars() {
        let block = Block::new(vec![Field::string("name").len_between(0, 3).optional()]);
        assert!(block.validate(&config(json!({"name": "äöü"}))).is_empty());
        let diags = block.validate(&config(json!({"name": "abcd"})));
        assert_eq!(
            diags[0].message,
            "expected length of name to be in the range (0 - 3), got abcd"
        );
    }

    #[test]
    fn test_nested_table_paths() {
        let block = Block::new(vec![
            Field::table(
                "member",
                Block::new(vec![Field::string("name").len_between(0, 4).optional()]),
            )
            .optional()
            .max_items(1),
        ]);
        let diags = block.validate(&config(json!({
            "member": [{"name": "ok"}, {"name": "too-long"}, {"bogus": "x"}]
        })));
        let paths: Vec<_> = diags.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["member", "member.1.name", "member.2.bogus"]);
    }

    #[test]
    fn test_required_unknown_and_computed() {
        let diags = addrgrp_like().validate(&config(json!({
            "uuid": "1234",
            "colour": 1,
            "exclude": "maybe",
        })));
        let rendered: Vec<String> = diags.iter().map(|d| d.to_string()).collect();
        assert!(rendered.contains(&"uuid: value is computed and cannot be set".to_string()));
        assert!(rendered.contains(&"colour: unsupported argument".to_string()));
        assert!(rendered.iter().any(|d| d.starts_with("exclude: expected exclude to be one of")));
        assert!(rendered.contains(&"category: required argument is missing".to_string()));
    }

    #[test]
    fn test_type_mismatch() {
        let diags = addrgrp_like().validate(&config(json!({
            "category": 200,
            "member": "srv1",
            "name": 5,
        })));
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_schema_serializes_kind_tag() {
        let json = serde_json::to_value(Field::table(
            "member",
            Block::new(vec![Field::string("name").optional()]),
        ))
        .unwrap();
        assert_eq!(json["kind"]["type"], "table");
        assert_eq!(json["kind"]["fields"][0]["name"], "name");
        assert!(json.get("format").is_none());
    }
}
