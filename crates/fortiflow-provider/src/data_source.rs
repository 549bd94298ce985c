//! Read-only data sources
//!
//! Each resource has a data source of the same name that looks one object
//! up by key, and a few tables have a `*list` data source returning the keys
//! of every object, optionally narrowed by a FortiOS `filter` expression.

use crate::error::{ProviderError, Result};
use crate::resource::{MkeyKind, ResourceDefinition};
use async_trait::async_trait;
use fortiflow_client::{CmdbPath, FortiClient};
use fortiflow_core::transform::refresh_with;
use fortiflow_core::{Block, Field, FieldKind, FlattenOptions, ResourceData};
use serde_json::Value;

#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> &Block;

    /// Fill the computed attributes of `data` from the device
    async fn read(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()>;
}

/// Look up one object of a CMDB table
#[derive(Debug, Clone)]
pub struct CmdbDataSource {
    type_name: &'static str,
    object: &'static str,
    path: CmdbPath,
    mkey: MkeyKind,
    schema: Block,
}

impl CmdbDataSource {
    /// Derive the data source from a resource: the key stays an input,
    /// everything else becomes computed.
    pub fn from_resource(def: &ResourceDefinition) -> Self {
        let key = def.mkey.field();
        let fields = def
            .schema
            .iter()
            .filter(|f| !f.local)
            .map(|f| {
                if Some(f.name) == key {
                    key_input(f)
                } else {
                    computed_copy(f)
                }
            })
            .chain(std::iter::once(vdomparam()))
            .collect();

        Self {
            type_name: def.type_name,
            object: def.object,
            path: def.path,
            mkey: def.mkey,
            schema: Block::new(fields),
        }
    }
}

#[async_trait]
impl DataSource for CmdbDataSource {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn schema(&self) -> &Block {
        &self.schema
    }

    async fn read(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()> {
        let mkey = match self.mkey {
            MkeyKind::Singleton(id) => {
                data.set_id(id);
                String::new()
            }
            MkeyKind::Name(field) | MkeyKind::Integer(field) => match data.get(field) {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(ProviderError::DataSource {
                        object: self.object,
                        message: format!("{} is required", field),
                    });
                }
            },
        };

        let found = client
            .read(&self.path, &mkey, data.vdomparam())
            .await
            .map_err(|e| ProviderError::DataSource {
                object: self.object,
                message: e.to_string(),
            })?;

        let Some(obj) = found else {
            tracing::warn!("{} {} not found", self.type_name, mkey);
            data.clear_id();
            return Ok(());
        };

        let options = FlattenOptions {
            all_tables: true,
            ..Default::default()
        };
        refresh_with(&self.schema, &obj, data, options).map_err(|e| ProviderError::DataSource {
            object: self.object,
            message: e.to_string(),
        })?;

        if !self.mkey.is_singleton() {
            data.set_id(mkey);
        }
        Ok(())
    }
}

/// Keys of every object of a CMDB table
#[derive(Debug, Clone)]
pub struct CmdbListDataSource {
    type_name: &'static str,
    object: &'static str,
    path: CmdbPath,
    key_field: &'static str,
    api_key: String,
    list_field: &'static str,
    schema: Block,
}

impl CmdbListDataSource {
    /// `list_type` is the data source name, `list_field` the computed
    /// attribute receiving the keys (e.g. `namelist`).
    pub fn from_resource(
        def: &ResourceDefinition,
        list_type: &'static str,
        list_field: &'static str,
    ) -> Option<Self> {
        let key_field = def.mkey.field()?;
        let api_key = def.schema.field(key_field)?.api_name.clone();

        let schema = Block::new(vec![
            Field::string("filter").optional(),
            Field::list(list_field).computed(),
            vdomparam(),
        ]);

        Some(Self {
            type_name: list_type,
            object: def.object,
            path: def.path,
            key_field,
            api_key,
            list_field,
            schema,
        })
    }
}

#[async_trait]
impl DataSource for CmdbListDataSource {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn schema(&self) -> &Block {
        &self.schema
    }

    async fn read(&self, client: &FortiClient, data: &mut ResourceData) -> Result<()> {
        let filter = data.get_str("filter").unwrap_or("").to_string();

        let items = client
            .list(&self.path, Some(&filter), data.vdomparam())
            .await
            .map_err(|e| ProviderError::DataSource {
                object: self.object,
                message: e.to_string(),
            })?;

        let keys: Vec<Value> = items
            .iter()
            .filter_map(|item| item.get(&self.api_key))
            .filter(|v| v.is_string() || v.is_number())
            .cloned()
            .collect();

        tracing::debug!(
            "{}: {} {} values",
            self.type_name,
            keys.len(),
            self.key_field
        );

        data.set_raw(self.list_field, Value::Array(keys));
        data.set_id(format!("DataSource{}List{}", self.object, filter));
        Ok(())
    }
}

fn vdomparam() -> Field {
    Field::string("vdomparam").optional().local()
}

fn key_input(field: &Field) -> Field {
    let mut key = field.clone();
    key.required = true;
    key.optional = false;
    key.computed = false;
    key.force_new = false;
    key
}

/// Computed-only copy of a field, recursively for tables
fn computed_copy(field: &Field) -> Field {
    let mut copy = field.clone();
    copy.required = false;
    copy.optional = false;
    copy.computed = true;
    copy.force_new = false;
    copy.validator = None;
    copy.max_items = None;
    if let FieldKind::Table(block) = &field.kind {
        copy.kind = FieldKind::Table(Block::new(block.iter().map(computed_copy).collect()));
    }
    copy
}
