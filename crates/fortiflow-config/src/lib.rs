//! Configuration for fortiflow
//!
//! Locates the `fortiflow.kdl` desired-state file and resolves the FortiGate
//! connection settings from the provider block and the environment.

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::ProviderSettings;

use std::path::PathBuf;

/// Environment variable naming the configuration file directly
pub const CONFIG_PATH_ENV: &str = "FORTIFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 4] = [
    "fortiflow.local.kdl",
    ".fortiflow.local.kdl",
    "fortiflow.kdl",
    ".fortiflow.kdl",
];

/// Global configuration file (`~/.config/fortiflow/fortiflow.kdl`)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fortiflow").join("fortiflow.kdl"))
}

/// Find the project's fortiflow.kdl
///
/// Search order:
/// 1. `FORTIFLOW_CONFIG_PATH`
/// 2. current directory: fortiflow.local.kdl, .fortiflow.local.kdl, fortiflow.kdl, .fortiflow.kdl
/// 3. the same names inside ./.fortiflow/
/// 4. ~/.config/fortiflow/fortiflow.kdl
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} points at missing file {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(".fortiflow");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(global_config) = global_config_path() {
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("fortiflow.kdl"), "// test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("fortiflow.kdl"));
    }

    #[test]
    #[serial]
    fn test_local_file_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("fortiflow.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join(".fortiflow.local.kdl"), "// local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with(".fortiflow.local.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let project_dir = temp_dir.path().join(".fortiflow");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("fortiflow.kdl"), "// in project dir").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with(".fortiflow/fortiflow.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("lab.kdl");
        fs::write(&config_path, "// custom").unwrap();

        let result = temp_env::with_var(
            CONFIG_PATH_ENV,
            Some(config_path.to_str().unwrap()),
            find_config_file,
        );
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    #[serial]
    fn test_find_config_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, None),
                ("HOME", home.path().to_str()),
                ("XDG_CONFIG_HOME", home.path().join(".config").to_str()),
            ],
            find_config_file,
        );
        std::env::set_current_dir(original_dir).unwrap();

        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound)));
    }
}
