use crate::commands::validate::ensure_valid;
use crate::output;
use crate::project::Project;
use colored::Colorize;

pub async fn handle(project: &Project) -> anyhow::Result<()> {
    ensure_valid(project)?;

    let state_manager = project.state_manager();
    let mut state = state_manager.load().await?;
    let provider = project.connect().await?;

    println!("{}", "Refreshing state...".blue());
    provider.refresh(&mut state).await?;

    let plan = provider.plan(&project.desired, &state)?;
    output::print_plan(&plan);
    Ok(())
}
