use crate::project::Project;
use colored::Colorize;

pub async fn handle(
    project: &Project,
    resource_type: &str,
    label: &str,
    id: &str,
) -> anyhow::Result<()> {
    let address = format!("{}.{}", resource_type, label);
    let config = project.desired.resource(&address);
    if config.is_none() {
        println!(
            "{}",
            format!(
                "Note: {} is not in the configuration yet, the next plan will delete it",
                address
            )
            .yellow()
        );
    }

    let state_manager = project.state_manager();
    let lock = state_manager.acquire_lock().await?;
    let mut state = state_manager.load().await?;
    let provider = project.connect().await?;

    let entry = provider
        .import(resource_type, label, id, config, &mut state)
        .await?;
    state_manager.save(&mut state).await?;
    lock.release().await?;

    println!(
        "{} Imported {} (id: {})",
        "✓".green(),
        address.cyan(),
        entry.id
    );
    Ok(())
}
