use crate::project::Project;
use colored::Colorize;
use fortiflow_provider::Catalog;
use serde_json::Value;

pub async fn handle_list(project: &Project) -> anyhow::Result<()> {
    let state = project.state_manager().load().await?;

    if state.resources.is_empty() {
        println!("{}", "No managed resources.".yellow());
        return Ok(());
    }

    for (address, resource) in &state.resources {
        println!("{}  (id: {})", address.cyan(), resource.id);
    }
    Ok(())
}

pub async fn handle_show(project: &Project, address: &str) -> anyhow::Result<()> {
    let state = project.state_manager().load().await?;
    let resource = state
        .get_resource(address)
        .ok_or_else(|| anyhow::anyhow!("{} is not in the state", address))?;

    let catalog = Catalog::builtin();
    let schema = catalog.resource(&resource.resource_type).map(|r| r.schema());

    println!("{}", address.bold());
    println!("  id: {}", resource.id);
    println!("  updated: {}", resource.updated_at);
    for (name, value) in &resource.attributes {
        let sensitive = schema
            .and_then(|s| s.field(name))
            .is_some_and(|f| f.sensitive);
        let rendered = if sensitive {
            "(sensitive)".to_string()
        } else {
            match value {
                Value::Array(_) | Value::Object(_) => serde_json::to_string_pretty(value)?
                    .lines()
                    .collect::<Vec<_>>()
                    .join("\n  "),
                other => other.to_string(),
            }
        };
        println!("  {} = {}", name, rendered);
    }
    Ok(())
}
