//! FortiOS provider
//!
//! Drives the resource handlers of the [`Catalog`] against one device:
//! validation, refresh, plan, apply, import and data source reads.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::catalog::Catalog;
use crate::error::{ProviderError, Result};
use crate::plan::{plan_orphans, plan_resource, planned_attributes};
use crate::resource::Resource;
use crate::state::{GlobalState, ResourceState};
use fortiflow_client::FortiClient;
use fortiflow_core::{DesiredState, Diagnostic, ResourceConfig, ResourceData};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Device information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Result of reading one data source
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceResult {
    pub address: String,
    pub id: String,
    pub attributes: Map<String, Value>,
}

pub struct FortiProvider {
    client: FortiClient,
    catalog: Catalog,
}

impl FortiProvider {
    pub fn new(client: FortiClient, catalog: Catalog) -> Self {
        Self { client, catalog }
    }

    pub fn client(&self) -> &FortiClient {
        &self.client
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Verify the token against `monitor/system/status`
    pub async fn check_auth(&self) -> AuthStatus {
        match self.client.system_status().await {
            Ok(status) => {
                let host = status
                    .hostname
                    .or(status.serial)
                    .unwrap_or_else(|| "FortiGate".to_string());
                let model = status.model_name.or(status.model).unwrap_or_default();
                let version = status.version.unwrap_or_default();
                AuthStatus::ok(format!("{} {} {}", host, model, version).trim().to_string())
            }
            Err(e) => AuthStatus::failed(e.to_string()),
        }
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.catalog
            .resource(type_name)
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
    }

    /// Refresh every state entry from the device. Objects that no longer
    /// exist are dropped from the state.
    pub async fn refresh(&self, state: &mut GlobalState) -> Result<()> {
        let addresses: Vec<String> = state.resources.keys().cloned().collect();

        for address in addresses {
            let Some(entry) = state.get_resource(&address) else {
                continue;
            };
            let resource = self.resource(&entry.resource_type)?;

            let mut data = entry.to_data();
            resource.read(&self.client, &mut data).await?;

            if data.is_gone() {
                state.remove_resource(&address);
            } else if let Some(entry) = state.resources.get_mut(&address) {
                entry.update_from(&data);
            }
        }
        Ok(())
    }

    /// Compare the configuration with the (refreshed) state
    pub fn plan(&self, desired: &DesiredState, state: &GlobalState) -> Result<Plan> {
        let diags = validate(&self.catalog, desired);
        if !diags.is_empty() {
            return Err(ProviderError::Validation(diags));
        }

        let mut actions = plan_orphans(state, |address| desired.resource(address).is_some());

        for config in &desired.resources {
            let resource = self.resource(&config.resource_type)?;
            actions.push(plan_resource(
                resource.schema(),
                config,
                state.get_resource(&config.address()),
            ));
        }

        let plan = Plan::new(actions);
        tracing::debug!("Plan: {}", plan.summary());
        Ok(plan)
    }

    /// Delete everything in the state
    pub fn plan_destroy(&self, state: &GlobalState) -> Plan {
        Plan::new(plan_orphans(state, |_| false))
    }

    /// Execute a plan, recording every outcome in `state`.
    ///
    /// A failed action does not stop the remaining ones.
    pub async fn apply(
        &self,
        plan: &Plan,
        desired: &DesiredState,
        state: &mut GlobalState,
    ) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            let outcome = match action.action_type {
                ActionType::NoOp => continue,
                ActionType::Delete => self.apply_delete(action, state).await,
                ActionType::Create => match desired.resource(&action.address) {
                    Some(config) => self.apply_create(config, state).await,
                    None => Err(missing_config(action)),
                },
                ActionType::Update => match desired.resource(&action.address) {
                    Some(config) => self.apply_update(config, state).await,
                    None => Err(missing_config(action)),
                },
                ActionType::Replace => match desired.resource(&action.address) {
                    Some(config) => match self.apply_delete(action, state).await {
                        Ok(_) => self.apply_create(config, state).await,
                        Err(e) => Err(e),
                    },
                    None => Err(missing_config(action)),
                },
            };

            match outcome {
                Ok(message) => result.add_success(action.address.clone(), message),
                Err(e) => {
                    tracing::error!("{}: {}", action.address, e);
                    result.add_failure(action.address.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn apply_create(
        &self,
        config: &ResourceConfig,
        state: &mut GlobalState,
    ) -> Result<String> {
        let resource = self.resource(&config.resource_type)?;
        let mut data = ResourceData::from_config(config.config.clone());

        resource.create(&self.client, &mut data).await?;

        if data.is_gone() {
            return Err(ProviderError::StateError(format!(
                "{} vanished right after creation",
                config.address()
            )));
        }

        let id = data.id().to_string();
        state.set_resource(
            config.address(),
            ResourceState::from_data(&config.resource_type, &data),
        );
        Ok(format!("Created {} (id: {})", config.address(), id))
    }

    async fn apply_update(
        &self,
        config: &ResourceConfig,
        state: &mut GlobalState,
    ) -> Result<String> {
        let address = config.address();
        let resource = self.resource(&config.resource_type)?;
        let current = state
            .get_resource(&address)
            .ok_or_else(|| ProviderError::StateError(format!("{} is not in state", address)))?;

        let planned = planned_attributes(resource.schema(), &config.config, &current.attributes);
        let mut data = ResourceData::from_config(planned)
            .with_id(current.id.clone())
            .with_prior(current.attributes.clone());

        resource.update(&self.client, &mut data).await?;

        if data.is_gone() {
            state.remove_resource(&address);
            return Ok(format!("{} disappeared during update", address));
        }

        let id = data.id().to_string();
        if let Some(entry) = state.resources.get_mut(&address) {
            entry.update_from(&data);
        }
        Ok(format!("Updated {} (id: {})", address, id))
    }

    async fn apply_delete(&self, action: &Action, state: &mut GlobalState) -> Result<String> {
        let Some(entry) = state.get_resource(&action.address) else {
            return Ok(format!("{} already gone", action.address));
        };
        let resource = self.resource(&entry.resource_type)?;

        let mut data = entry.to_data();
        resource.delete(&self.client, &mut data).await?;

        state.remove_resource(&action.address);
        Ok(format!("Deleted {}", action.address))
    }

    /// Bring an existing object under management.
    ///
    /// Provider-side settings (`vdomparam`, table options) and the tables
    /// to track are taken from the matching configuration block, if any.
    pub async fn import(
        &self,
        resource_type: &str,
        label: &str,
        id: &str,
        config: Option<&ResourceConfig>,
        state: &mut GlobalState,
    ) -> Result<ResourceState> {
        let resource = self.resource(resource_type)?;
        let address = format!("{}.{}", resource_type, label);

        if state.get_resource(&address).is_some() {
            return Err(ProviderError::StateError(format!(
                "{} is already managed",
                address
            )));
        }

        let mut data = match config {
            Some(config) => ResourceData::from_config(config.config.clone()),
            None => ResourceData::new(),
        };
        resource.import(&self.client, id, &mut data).await?;

        let entry = ResourceState::from_data(resource_type, &data);
        state.set_resource(address.clone(), entry.clone());
        tracing::info!("Imported {} (id: {})", address, id);
        Ok(entry)
    }

    /// Read every configured data source
    pub async fn read_data_sources(&self, desired: &DesiredState) -> Result<Vec<DataSourceResult>> {
        let mut results = Vec::new();

        for config in &desired.data_sources {
            let data_source = self
                .catalog
                .data_source(&config.resource_type)
                .ok_or_else(|| ProviderError::UnknownDataSource(config.resource_type.clone()))?;

            let mut data = ResourceData::from_config(config.config.clone());
            data_source.read(&self.client, &mut data).await?;

            results.push(DataSourceResult {
                address: format!("data.{}", config.address()),
                id: data.id().to_string(),
                attributes: data.into_attributes(),
            });
        }

        Ok(results)
    }
}

/// Check every block of the configuration against its schema
pub fn validate(catalog: &Catalog, desired: &DesiredState) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for config in &desired.resources {
        let address = config.address();
        match catalog.resource(&config.resource_type) {
            Some(resource) => diags.extend(
                resource
                    .schema()
                    .validate(&config.config)
                    .into_iter()
                    .map(|d| prefixed(&address, d)),
            ),
            None => diags.push(Diagnostic::new(address, "unknown resource type")),
        }
    }

    for config in &desired.data_sources {
        let address = format!("data.{}", config.address());
        match catalog.data_source(&config.resource_type) {
            Some(data_source) => diags.extend(
                data_source
                    .schema()
                    .validate(&config.config)
                    .into_iter()
                    .map(|d| prefixed(&address, d)),
            ),
            None => diags.push(Diagnostic::new(address, "unknown data source")),
        }
    }

    diags
}

fn prefixed(address: &str, diag: Diagnostic) -> Diagnostic {
    Diagnostic::new(format!("{}.{}", address, diag.path), diag.message)
}

fn missing_config(action: &Action) -> ProviderError {
    ProviderError::StateError(format!(
        "{} is planned but has no configuration",
        action.address
    ))
}
