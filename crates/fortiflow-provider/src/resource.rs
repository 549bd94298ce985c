//! Resource handlers
//!
//! Every FortiOS object follows the same lifecycle, so a single
//! [`CmdbResource`] implements [`Resource`] for any [`ResourceDefinition`].

use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use fortiflow_client::{ApiResponse, CmdbPath, FortiClient};
use fortiflow_core::transform::expand_object;
use fortiflow_core::{Block, ResourceData, refresh};
use serde_json::Value;

/// How instances of an object are keyed on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MkeyKind {
    /// String key held in the named field
    Name(&'static str),
    /// Integer key held in the named field, usually assigned by the device
    Integer(&'static str),
    /// Single instance per vdom, addressed by the bare path. The value is the
    /// ID recorded in state.
    Singleton(&'static str),
}

impl MkeyKind {
    /// Schema field carrying the key
    pub fn field(&self) -> Option<&'static str> {
        match self {
            MkeyKind::Name(f) | MkeyKind::Integer(f) => Some(f),
            MkeyKind::Singleton(_) => None,
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, MkeyKind::Singleton(_))
    }
}

/// Static description of one FortiOS object type
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    /// Resource type (e.g., "fortios_firewall_addrgrp")
    pub type_name: &'static str,

    /// Object name used in messages (e.g., "FirewallAddrgrp")
    pub object: &'static str,

    pub path: CmdbPath,
    pub mkey: MkeyKind,
    pub schema: Block,
}

/// Lifecycle of a managed object
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> &Block;

    async fn create(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the device. Clears the ID when the object is gone.
    async fn read(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()>;

    async fn delete(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()>;

    /// Adopt an existing object by its key
    async fn import(&self, client: &FortiClient, id: &str, data: &mut ResourceData) -> Result<()> {
        data.set_id(id);
        self.read(client, data).await?;
        if data.is_gone() {
            return Err(ProviderError::ImportNotFound(format!(
                "{} {}",
                self.type_name(),
                id
            )));
        }
        Ok(())
    }
}

/// [`Resource`] backed by a CMDB table
#[derive(Debug, Clone)]
pub struct CmdbResource {
    def: ResourceDefinition,
}

impl CmdbResource {
    pub fn new(def: ResourceDefinition) -> Self {
        Self { def }
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.def
    }

    /// Device key for the current ID. Singletons have none.
    fn mkey<'a>(&self, data: &'a ResourceData) -> &'a str {
        if self.def.mkey.is_singleton() {
            ""
        } else {
            data.id()
        }
    }

    /// ID after a create or update
    fn id_from_response(&self, response: &ApiResponse, data: &ResourceData) -> String {
        if let MkeyKind::Singleton(id) = self.def.mkey {
            return id.to_string();
        }
        if let Some(mkey) = response.mkey_string() {
            return mkey;
        }
        self.def
            .mkey
            .field()
            .and_then(|f| data.get_ok(f))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| self.def.object.to_string())
    }
}

#[async_trait]
impl Resource for CmdbResource {
    fn type_name(&self) -> &str {
        self.def.type_name
    }

    fn schema(&self) -> &Block {
        &self.def.schema
    }

    async fn create(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()> {
        let obj = expand_object(&self.def.schema, data);
        let vdomparam = data.vdomparam().to_string();
        let client = client.with_retries(1);

        let result = if self.def.mkey.is_singleton() {
            client.update(&self.def.path, &obj, "", &vdomparam).await
        } else {
            client.create(&self.def.path, &obj, &vdomparam).await
        };
        let response = result.map_err(|e| ProviderError::resource("creating", self.def.object, e))?;

        let id = self.id_from_response(&response, data);
        tracing::info!("Created {} {}", self.def.type_name, id);
        data.set_id(id);

        self.read(&client, data).await
    }

    async fn read(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()> {
        let found = client
            .read(&self.def.path, self.mkey(data), data.vdomparam())
            .await
            .map_err(|e| ProviderError::resource("reading", self.def.object, e))?;

        let Some(obj) = found else {
            tracing::warn!(
                "{} ({}) not found, removing from state",
                self.def.type_name,
                data.id()
            );
            data.clear_id();
            return Ok(());
        };

        refresh(&self.def.schema, &obj, data)
            .map_err(|e| ProviderError::resource("reading", self.def.object, e))
    }

    async fn update(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()> {
        let obj = expand_object(&self.def.schema, data);
        let vdomparam = data.vdomparam().to_string();
        let client = client.with_retries(1);

        let response = client
            .update(&self.def.path, &obj, self.mkey(data), &vdomparam)
            .await
            .map_err(|e| ProviderError::resource("updating", self.def.object, e))?;

        let id = self.id_from_response(&response, data);
        if id != data.id() {
            tracing::info!("{} re-keyed from {} to {}", self.def.type_name, data.id(), id);
        }
        tracing::info!("Updated {} {}", self.def.type_name, id);
        data.set_id(id);

        self.read(&client, data).await
    }

    async fn delete(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()> {
        if self.def.mkey.is_singleton() {
            tracing::debug!("{} is a singleton, removing from state only", self.def.type_name);
            data.clear_id();
            return Ok(());
        }

        match client
            .delete(&self.def.path, data.id(), data.vdomparam())
            .await
        {
            Ok(()) => tracing::info!("Deleted {} {}", self.def.type_name, data.id()),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} already gone", self.def.type_name, data.id())
            }
            Err(e) => return Err(ProviderError::resource("deleting", self.def.object, e)),
        }

        data.clear_id();
        Ok(())
    }
}
