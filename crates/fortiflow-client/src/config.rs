//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(250);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Connection settings for one FortiGate
#[derive(Clone)]
pub struct ClientConfig {
    /// Host, `host:port` or full `https://` URL
    pub hostname: String,

    /// REST API administrator token
    pub token: String,

    /// Skip TLS certificate verification
    pub insecure: bool,

    /// PEM bundle of additional trusted CAs
    pub cabundle_file: Option<PathBuf>,

    /// vdom used when a resource does not set `vdomparam`
    pub vdom: Option<String>,

    pub http_proxy: Option<String>,

    /// Retries after a connect or timeout failure
    pub retries: u32,

    pub retry_delay: Duration,

    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(hostname: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            token: token.into(),
            insecure: false,
            cabundle_file: None,
            vdom: None,
            http_proxy: None,
            retries: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_cabundle_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cabundle_file = Some(path.into());
        self
    }

    pub fn with_vdom(mut self, vdom: impl Into<String>) -> Self {
        self.vdom = Some(vdom.into());
        self
    }

    pub fn with_http_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http_proxy = Some(proxy.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the device. Bare hostnames get `https://`.
    pub fn base_url(&self) -> String {
        let host = self.hostname.trim().trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hostname", &self.hostname)
            .field("token", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .field("cabundle_file", &self.cabundle_file)
            .field("vdom", &self.vdom)
            .field("http_proxy", &self.http_proxy)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .field("timeout", &self.timeout)
            .finish()
    }
}
