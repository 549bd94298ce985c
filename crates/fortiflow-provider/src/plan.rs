//! Configuration vs. state comparison

use crate::action::{Action, ActionType, AttributeChange};
use crate::state::{GlobalState, ResourceState};
use fortiflow_core::helpers::{SortMode, convintf2i, dynamic_sort_subtable, ipmask_to_cidr};
use fortiflow_core::{Block, Field, FieldKind, ResourceConfig, ValueFormat, is_set};
use serde_json::{Map, Value};

/// Attributes the object should have after apply.
///
/// Computed fields the configuration leaves out keep their current value,
/// so device defaults never show up as changes.
pub fn planned_attributes(
    schema: &Block,
    config: &Map<String, Value>,
    current: &Map<String, Value>,
) -> Map<String, Value> {
    let mut planned = config.clone();
    for field in schema.iter().filter(|f| f.computed) {
        if planned.get(field.name).is_some_and(is_set) {
            continue;
        }
        if let Some(value) = current.get(field.name) {
            planned.insert(field.name.to_string(), value.clone());
        }
    }
    planned
}

/// Attributes whose planned value differs from the current one
pub fn diff(
    schema: &Block,
    planned: &Map<String, Value>,
    current: &Map<String, Value>,
) -> Vec<AttributeChange> {
    let sort = SortMode::parse(
        planned
            .get("dynamic_sort_subtable")
            .and_then(Value::as_str)
            .unwrap_or("false"),
    );

    schema
        .iter()
        .filter_map(|field| {
            let after = planned.get(field.name).filter(|v| is_set(v));
            let before = current.get(field.name).filter(|v| is_set(v));
            let same = match (after, before) {
                (None, None) => true,
                // Sensitive values the configuration leaves out are not tracked
                (None, Some(_)) if field.sensitive => true,
                (Some(a), Some(b)) => value_eq(field, a, b, sort),
                _ => false,
            };
            if same {
                return None;
            }
            Some(AttributeChange {
                name: field.name.to_string(),
                before: before.cloned(),
                after: after.cloned(),
                forces_replacement: field.force_new,
                sensitive: field.sensitive,
            })
        })
        .collect()
}

/// Action for one configured resource
pub fn plan_resource(
    schema: &Block,
    config: &ResourceConfig,
    current: Option<&ResourceState>,
) -> Action {
    let address = config.address();

    let Some(current) = current else {
        let changes = diff(schema, &config.config, &Map::new());
        return Action::new(address, ActionType::Create, &config.resource_type, "")
            .with_changes(changes);
    };

    let planned = planned_attributes(schema, &config.config, &current.attributes);
    let changes = diff(schema, &planned, &current.attributes);

    let action_type = if changes.is_empty() {
        ActionType::NoOp
    } else if changes.iter().any(|c| c.forces_replacement) {
        ActionType::Replace
    } else {
        ActionType::Update
    };

    Action::new(address, action_type, &config.resource_type, &current.id).with_changes(changes)
}

/// Delete actions for state entries the configuration no longer has
pub fn plan_orphans(state: &GlobalState, configured: impl Fn(&str) -> bool) -> Vec<Action> {
    state
        .resources
        .iter()
        .filter(|(address, _)| !configured(address.as_str()))
        .map(|(address, r)| Action::new(address, ActionType::Delete, &r.resource_type, &r.id))
        .collect()
}

fn value_eq(field: &Field, planned: &Value, current: &Value, sort: SortMode) -> bool {
    match &field.kind {
        FieldKind::Int => convintf2i(planned) == convintf2i(current),
        FieldKind::String if field.format == ValueFormat::Ipv4ClassNet => {
            classnet(planned) == classnet(current)
        }
        FieldKind::String | FieldKind::List => planned == current,
        FieldKind::Table(block) => {
            let (Some(planned), Some(current)) = (planned.as_array(), current.as_array()) else {
                return planned == current;
            };
            if planned.len() != current.len() {
                return false;
            }
            let mut planned = planned.clone();
            if let Some(key) = block.key() {
                dynamic_sort_subtable(&mut planned, key, sort);
            }
            planned
                .iter()
                .zip(current)
                .all(|(p, c)| entry_eq(block, p, c, sort))
        }
    }
}

fn entry_eq(block: &Block, planned: &Value, current: &Value, sort: SortMode) -> bool {
    let (Some(planned), Some(current)) = (planned.as_object(), current.as_object()) else {
        return planned == current;
    };
    block.iter().all(|field| {
        let p = planned.get(field.name).filter(|v| is_set(v));
        let c = current.get(field.name).filter(|v| is_set(v));
        match (p, c) {
            (None, None) => true,
            (None, Some(_)) => field.computed,
            (Some(a), Some(b)) => value_eq(field, a, b, sort),
            (Some(_), None) => false,
        }
    })
}

/// `a.b.c.d m.m.m.m` and `a.b.c.d/n` compare equal
fn classnet(value: &Value) -> Option<String> {
    let s = value.as_str()?;
    Some(ipmask_to_cidr(s).unwrap_or_else(|| s.to_string()))
}
