use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No configuration file found. Looked for:\n\
        - current directory: fortiflow.local.kdl, .fortiflow.local.kdl, fortiflow.kdl, .fortiflow.kdl\n\
        - the ./.fortiflow/ directory\n\
        - ~/.config/fortiflow/fortiflow.kdl\n\
        Set FORTIFLOW_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("{setting} is not set: add it to the provider block or export {env}")]
    MissingSetting {
        setting: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
