//! Configuration file, state location and device connection of a project

use anyhow::Context;
use colored::Colorize;
use fortiflow_client::FortiClient;
use fortiflow_config::ProviderSettings;
use fortiflow_core::DesiredState;
use fortiflow_provider::{Catalog, FortiProvider, StateManager};
use std::path::{Path, PathBuf};

pub struct Project {
    pub config_path: PathBuf,
    /// Directory holding `.fortiflow/state.json`
    pub root: PathBuf,
    pub desired: DesiredState,
}

impl Project {
    /// Load the configuration file given on the command line, or the
    /// discovered one
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => anyhow::bail!("Configuration file not found: {}", path.display()),
            None => fortiflow_config::find_config_file()?,
        };

        let desired = fortiflow_core::parse_kdl_file(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        let root = project_root(&config_path);
        tracing::debug!(
            "Loaded {} ({} resources, {} data sources), state in {}",
            config_path.display(),
            desired.resources.len(),
            desired.data_sources.len(),
            root.display()
        );

        Ok(Self {
            config_path,
            root,
            desired,
        })
    }

    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.root)
    }

    /// Build the provider and verify the token
    pub async fn connect(&self) -> anyhow::Result<FortiProvider> {
        let settings = ProviderSettings::resolve(&self.desired.provider)?;
        let client = FortiClient::new(settings.to_client_config()?)?;
        let provider = FortiProvider::new(client, Catalog::builtin());

        let auth = provider.check_auth().await;
        if !auth.authenticated {
            anyhow::bail!(
                "Authentication failed: {}",
                auth.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        if let Some(info) = auth.account_info {
            eprintln!("Connected to {}", info.cyan());
        }
        Ok(provider)
    }
}

/// Files inside `.fortiflow/` belong to the directory above it
fn project_root(config_path: &Path) -> PathBuf {
    let parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if parent.file_name().is_some_and(|name| name == ".fortiflow") {
        if let Some(grandparent) = parent.parent() {
            return grandparent.to_path_buf();
        }
    }
    parent.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root() {
        assert_eq!(
            project_root(Path::new("/srv/fw/fortiflow.kdl")),
            PathBuf::from("/srv/fw")
        );
        assert_eq!(
            project_root(Path::new("/srv/fw/.fortiflow/fortiflow.kdl")),
            PathBuf::from("/srv/fw")
        );
        assert_eq!(project_root(Path::new("fortiflow.kdl")), PathBuf::from("."));
    }
}
