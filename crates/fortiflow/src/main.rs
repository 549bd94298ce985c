mod commands;
mod output;
mod project;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fortiflow")]
#[command(about = "Declarative FortiOS configuration from KDL files", long_about = None)]
struct Cli {
    /// Configuration file (default: discovered from the current directory)
    #[arg(short, long, global = true, env = "FORTIFLOW_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes apply would make
    Plan,
    /// Apply the configuration to the device
    Apply {
        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every managed object
    Destroy {
        /// Destroy without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Bring an existing object under management
    Import {
        /// Resource type (e.g. fortios_firewall_addrgrp)
        resource_type: String,
        /// Local name for the resource
        label: String,
        /// Device key of the object (name or numeric id)
        id: String,
    },
    /// Inspect the state file
    #[command(subcommand)]
    State(StateCommands),
    /// Read the data sources of the configuration
    Data {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Check the configuration without contacting the device
    Validate,
    /// Show supported resource types, or the attributes of one
    Schema {
        /// Resource or data source type
        resource_type: Option<String>,
        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum StateCommands {
    /// List managed resources
    List,
    /// Show the recorded attributes of one resource
    Show {
        /// Resource address (type.label)
        address: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `data` output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("fortiflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Schema {
            resource_type,
            json,
        } => commands::schema::handle(resource_type.as_deref(), json),
        Commands::Validate => {
            let project = project::Project::load(cli.config.as_deref())?;
            commands::validate::handle(&project)
        }
        Commands::Plan => {
            let project = project::Project::load(cli.config.as_deref())?;
            commands::plan::handle(&project).await
        }
        Commands::Apply { yes } => {
            let project = project::Project::load(cli.config.as_deref())?;
            commands::apply::handle(&project, yes).await
        }
        Commands::Destroy { yes } => {
            let project = project::Project::load(cli.config.as_deref())?;
            commands::apply::handle_destroy(&project, yes).await
        }
        Commands::Import {
            resource_type,
            label,
            id,
        } => {
            let project = project::Project::load(cli.config.as_deref())?;
            commands::import::handle(&project, &resource_type, &label, &id).await
        }
        Commands::State(state_cmd) => {
            let project = project::Project::load(cli.config.as_deref())?;
            match state_cmd {
                StateCommands::List => commands::state::handle_list(&project).await,
                StateCommands::Show { address } => {
                    commands::state::handle_show(&project, &address).await
                }
            }
        }
        Commands::Data { format } => {
            let project = project::Project::load(cli.config.as_deref())?;
            commands::data::handle(&project, format).await
        }
    }
}
