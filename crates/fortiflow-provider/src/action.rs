//! Action types for FortiOS object management

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a planned action for one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Resource address (`type.label`)
    pub address: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "fortios_firewall_addrgrp")
    pub resource_type: String,

    /// Device ID of the existing object, empty for creates
    pub resource_id: String,

    /// Description of the action
    pub description: String,

    /// Attribute changes behind an update or replace
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<AttributeChange>,
}

impl Action {
    pub fn new(
        address: impl Into<String>,
        action_type: ActionType,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let address = address.into();
        let description = format!("{} {}", action_type.verb(), address);
        Self {
            address,
            action_type,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            description,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(mut self, changes: Vec<AttributeChange>) -> Self {
        self.changes = changes;
        self
    }
}

/// One attribute that differs between configuration and state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    /// The object must be recreated for this change
    pub forces_replacement: bool,
    pub sensitive: bool,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new object
    Create,
    /// Update an existing object in place
    Update,
    /// Delete and recreate an object
    Replace,
    /// Delete an object
    Delete,
    /// No changes needed
    NoOp,
}

impl ActionType {
    fn verb(&self) -> &'static str {
        match self {
            ActionType::Create => "Create",
            ActionType::Update => "Update",
            ActionType::Replace => "Replace",
            ActionType::Delete => "Delete",
            ActionType::NoOp => "Keep",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, address: String, message: String) {
        self.succeeded.push(ActionResult {
            address,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, address: String, error: String) {
        self.failed.push(ActionResult {
            address,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Address of the resource
    pub address: String,

    pub success: bool,

    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Actions in execution order
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn action(&self, address: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.address == address)
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            replace: self.actions_by_type(ActionType::Replace).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_summary() {
        let plan = Plan::new(vec![
            Action::new("fortios_firewall_addrgrp.a", ActionType::Create, "fortios_firewall_addrgrp", ""),
            Action::new("fortios_router_static.b", ActionType::Replace, "fortios_router_static", "3"),
            Action::new("fortios_router_static.c", ActionType::NoOp, "fortios_router_static", "4"),
        ]);

        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to create, 0 to update, 1 to replace, 0 to delete, 1 unchanged"
        );
        assert_eq!(
            plan.action("fortios_router_static.b").map(|a| a.description.as_str()),
            Some("Replace fortios_router_static.b")
        );
    }

    #[test]
    fn test_noop_plan_has_no_changes() {
        let plan = Plan::new(vec![Action::new(
            "fortios_system_sshconfig.ssh",
            ActionType::NoOp,
            "fortios_system_sshconfig",
            "SystemSshConfig",
        )]);
        assert!(!plan.has_changes);
        assert!(!Plan::empty().has_changes);
    }
}
