//! FortiOS resources for fortiflow
//!
//! - [`catalog`]: schemas of the supported CMDB objects
//! - [`resource`] / [`data_source`]: the generic CRUD and read handlers
//! - [`plan`] / [`action`]: configuration vs. state comparison
//! - [`state`]: `.fortiflow/state.json` persistence and locking
//! - [`provider`]: the orchestrator tying them to a [`fortiflow_client::FortiClient`]

pub mod action;
pub mod catalog;
pub mod data_source;
pub mod error;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod state;

pub use action::{Action, ActionResult, ActionType, ApplyResult, AttributeChange, Plan, PlanSummary};
pub use catalog::Catalog;
pub use data_source::{CmdbDataSource, CmdbListDataSource, DataSource};
pub use error::{ProviderError, Result};
pub use provider::{AuthStatus, DataSourceResult, FortiProvider, validate};
pub use resource::{CmdbResource, MkeyKind, Resource, ResourceDefinition};
pub use state::{GlobalState, ResourceState, StateLock, StateManager};
