//! FortiOS REST API client for fortiflow
//!
//! Thin async client over the CMDB endpoints of a FortiGate. Objects are
//! sent and received as JSON maps with FortiOS (hyphenated) attribute names.
//!
//! # Example
//!
//! ```ignore
//! use fortiflow_client::{ClientConfig, CmdbPath, FortiClient};
//!
//! let client = FortiClient::new(ClientConfig::new("192.168.1.99", token).with_vdom("root"))?;
//!
//! let path = CmdbPath::new("firewall/addrgrp");
//! if let Some(group) = client.read(&path, "web-servers", "").await? {
//!     println!("{:?}", group.get("member"));
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::FortiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use types::{ApiResponse, CmdbPath, SystemStatus};
