use crate::project::Project;
use colored::Colorize;
use fortiflow_provider::Catalog;

pub fn handle(project: &Project) -> anyhow::Result<()> {
    println!("{}", "Validating configuration...".blue());
    println!(
        "Configuration file: {}",
        project.config_path.display().to_string().cyan()
    );

    ensure_valid(project)?;

    println!("{}", "✓ Configuration is valid".green().bold());
    println!();
    println!("Summary:");
    println!("  Resources: {}", project.desired.resources.len());
    for resource in &project.desired.resources {
        println!("    - {}", resource.address().cyan());
    }
    println!("  Data sources: {}", project.desired.data_sources.len());
    for data in &project.desired.data_sources {
        println!("    - data.{}", data.address().cyan());
    }

    Ok(())
}

/// Fail with the list of problems if the configuration does not validate
pub fn ensure_valid(project: &Project) -> anyhow::Result<()> {
    let diags = fortiflow_provider::validate(&Catalog::builtin(), &project.desired);
    if diags.is_empty() {
        return Ok(());
    }

    eprintln!();
    eprintln!("{}", "✗ Configuration errors".red().bold());
    for diag in &diags {
        eprintln!("  {}: {}", diag.path.yellow(), diag.message);
    }
    anyhow::bail!("{} problem(s) found", diags.len())
}
