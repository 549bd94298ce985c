use crate::OutputFormat;
use crate::commands::validate::ensure_valid;
use crate::project::Project;

pub async fn handle(project: &Project, format: OutputFormat) -> anyhow::Result<()> {
    if project.desired.data_sources.is_empty() {
        anyhow::bail!("The configuration declares no data sources");
    }
    ensure_valid(project)?;

    let provider = project.connect().await?;
    let results = provider.read_data_sources(&project.desired).await?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&results)?,
        OutputFormat::Yaml => serde_yaml::to_string(&results)?,
    };
    println!("{}", rendered);
    Ok(())
}
