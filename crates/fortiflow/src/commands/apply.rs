use crate::commands::validate::ensure_valid;
use crate::output;
use crate::project::Project;
use colored::Colorize;
use fortiflow_core::DesiredState;

pub async fn handle(project: &Project, yes: bool) -> anyhow::Result<()> {
    ensure_valid(project)?;

    let state_manager = project.state_manager();
    let lock = state_manager.acquire_lock().await?;
    let mut state = state_manager.load().await?;
    let provider = project.connect().await?;

    println!("{}", "Refreshing state...".blue());
    provider.refresh(&mut state).await?;

    let plan = provider.plan(&project.desired, &state)?;
    output::print_plan(&plan);

    if !plan.has_changes {
        // Refresh may still have dropped objects deleted on the device
        state_manager.save(&mut state).await?;
        lock.release().await?;
        return Ok(());
    }

    if !yes {
        println!();
        println!("Run with {} to apply these changes", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    println!();
    println!("{}", "Applying...".blue().bold());
    let result = provider.apply(&plan, &project.desired, &mut state).await;
    state_manager.save(&mut state).await?;
    lock.release().await?;

    output::print_apply_result(&result);
    if !result.is_success() {
        anyhow::bail!("{} action(s) failed", result.failed.len());
    }
    Ok(())
}

pub async fn handle_destroy(project: &Project, yes: bool) -> anyhow::Result<()> {
    let state_manager = project.state_manager();
    let lock = state_manager.acquire_lock().await?;
    let mut state = state_manager.load().await?;

    if state.resources.is_empty() {
        println!("{}", "Nothing to destroy.".green());
        lock.release().await?;
        return Ok(());
    }

    let provider = project.connect().await?;
    provider.refresh(&mut state).await?;

    let plan = provider.plan_destroy(&state);
    output::print_plan(&plan);

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: every object above will be deleted from the device.".yellow()
        );
        println!("Run with {} to destroy", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    println!();
    println!("{}", "Destroying...".red().bold());
    let result = provider.apply(&plan, &DesiredState::default(), &mut state).await;
    state_manager.save(&mut state).await?;
    lock.release().await?;

    output::print_apply_result(&result);
    if !result.is_success() {
        anyhow::bail!("{} action(s) failed", result.failed.len());
    }
    Ok(())
}
