//! Terminal rendering of plans and apply results

use colored::Colorize;
use fortiflow_provider::{Action, ActionType, ApplyResult, AttributeChange, Plan};
use serde_json::Value;

pub fn print_plan(plan: &Plan) {
    if !plan.has_changes {
        println!("{}", "No changes. The device matches the configuration.".green());
        return;
    }

    println!();
    for action in plan.actions.iter().filter(|a| a.action_type != ActionType::NoOp) {
        print_action(action);
    }
    println!();
    println!("{} {}", "Plan:".bold(), plan.summary());
}

fn print_action(action: &Action) {
    let header = match action.action_type {
        ActionType::Create => format!("  + {}", action.address).green(),
        ActionType::Update => format!("  ~ {}", action.address).yellow(),
        ActionType::Replace => format!("-/+ {}", action.address).red(),
        ActionType::Delete => format!("  - {}", action.address).red(),
        ActionType::NoOp => return,
    };
    if action.resource_id.is_empty() {
        println!("{}", header);
    } else {
        println!("{} (id: {})", header, action.resource_id);
    }

    for change in &action.changes {
        print_change(action.action_type, change);
    }
}

fn print_change(action_type: ActionType, change: &AttributeChange) {
    let render = |v: &Option<Value>| match v {
        None => "(unset)".to_string(),
        Some(_) if change.sensitive => "(sensitive)".to_string(),
        Some(v) => v.to_string(),
    };

    let line = if action_type == ActionType::Create {
        format!("      {} = {}", change.name, render(&change.after))
    } else {
        format!(
            "      {}: {} -> {}",
            change.name,
            render(&change.before),
            render(&change.after)
        )
    };

    if change.forces_replacement && action_type == ActionType::Replace {
        println!("{} {}", line, "# forces replacement".red());
    } else {
        println!("{}", line);
    }
}

pub fn print_apply_result(result: &ApplyResult) {
    println!();
    for ok in &result.succeeded {
        println!("  {} {}", "✓".green(), ok.message);
    }
    for failed in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.address,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!();

    let summary = format!(
        "{} succeeded, {} failed ({} ms)",
        result.succeeded.len(),
        result.failed.len(),
        result.duration_ms
    );
    if result.is_success() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
}
