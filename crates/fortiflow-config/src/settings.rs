//! FortiGate connection settings
//!
//! Values come from the `provider { ... }` block of the configuration file,
//! falling back to `FORTIOS_*` environment variables.

use crate::error::{ConfigError, Result};
use fortiflow_client::ClientConfig;
use fortiflow_core::ProviderBlock;
use std::path::PathBuf;

pub const HOSTNAME_ENV: &str = "FORTIOS_ACCESS_HOSTNAME";
pub const TOKEN_ENV: &str = "FORTIOS_ACCESS_TOKEN";
pub const INSECURE_ENV: &str = "FORTIOS_INSECURE";
pub const CABUNDLE_ENV: &str = "FORTIOS_CA_CABUNDLE";
pub const VDOM_ENV: &str = "FORTIOS_VDOM";
pub const HTTP_PROXY_ENV: &str = "FORTIOS_HTTP_PROXY";

/// Resolved provider settings
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub hostname: Option<String>,
    pub token: Option<String>,
    pub insecure: bool,
    pub cabundle_file: Option<PathBuf>,
    pub vdom: Option<String>,
    pub http_proxy: Option<String>,
    pub retries: u32,
}

impl ProviderSettings {
    /// Settings from the `FORTIOS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let insecure = match env(INSECURE_ENV) {
            Some(value) => parse_bool(INSECURE_ENV, &value)?,
            None => false,
        };

        Ok(Self {
            hostname: env(HOSTNAME_ENV),
            token: env(TOKEN_ENV),
            insecure,
            cabundle_file: env(CABUNDLE_ENV).map(PathBuf::from),
            vdom: env(VDOM_ENV),
            http_proxy: env(HTTP_PROXY_ENV),
            retries: 0,
        })
    }

    /// Overlay the values set in a provider block
    pub fn merge(mut self, block: &ProviderBlock) -> Self {
        if let Some(hostname) = &block.hostname {
            self.hostname = Some(hostname.clone());
        }
        if let Some(token) = &block.token {
            self.token = Some(token.clone());
        }
        if let Some(insecure) = block.insecure {
            self.insecure = insecure;
        }
        if let Some(cabundle_file) = &block.cabundle_file {
            self.cabundle_file = Some(PathBuf::from(cabundle_file));
        }
        if let Some(vdom) = &block.vdom {
            self.vdom = Some(vdom.clone());
        }
        if let Some(http_proxy) = &block.http_proxy {
            self.http_proxy = Some(http_proxy.clone());
        }
        if let Some(retries) = block.retries {
            self.retries = retries;
        }
        self
    }

    /// Environment first, then the provider block on top
    pub fn resolve(block: &ProviderBlock) -> Result<Self> {
        Ok(Self::from_env()?.merge(block))
    }

    pub fn to_client_config(&self) -> Result<ClientConfig> {
        let hostname = self.hostname.as_deref().ok_or(ConfigError::MissingSetting {
            setting: "hostname",
            env: HOSTNAME_ENV,
        })?;
        let token = self.token.as_deref().ok_or(ConfigError::MissingSetting {
            setting: "token",
            env: TOKEN_ENV,
        })?;

        let mut config = ClientConfig::new(hostname, token)
            .with_insecure(self.insecure)
            .with_retries(self.retries);
        if let Some(path) = &self.cabundle_file {
            config = config.with_cabundle_file(path.clone());
        }
        if let Some(vdom) = &self.vdom {
            config = config.with_vdom(vdom.clone());
        }
        if let Some(proxy) = &self.http_proxy {
            config = config.with_http_proxy(proxy.clone());
        }

        tracing::debug!("Connecting to {}", config.base_url());
        Ok(config)
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("hostname", &self.hostname)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("insecure", &self.insecure)
            .field("cabundle_file", &self.cabundle_file)
            .field("vdom", &self.vdom)
            .field("http_proxy", &self.http_proxy)
            .field("retries", &self.retries)
            .finish()
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidSetting {
            name,
            value: value.to_string(),
        }),
    }
}
