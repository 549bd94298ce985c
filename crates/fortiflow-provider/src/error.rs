//! Provider error types

use fortiflow_core::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    /// CRUD failure, e.g. "Error creating FirewallAddrgrp resource: ..."
    #[error("Error {action} {object} resource: {message}")]
    Resource {
        action: &'static str,
        object: &'static str,
        message: String,
    },

    #[error("Error describing {object}: {message}")]
    DataSource {
        object: &'static str,
        message: String,
    },

    #[error("Cannot import non-existent remote object: {0}")]
    ImportNotFound(String),

    #[error("Invalid configuration: {} problem(s) found", .0.len())]
    Validation(Vec<Diagnostic>),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error(transparent)]
    Client(#[from] fortiflow_client::ClientError),

    #[error(transparent)]
    Core(#[from] fortiflow_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub(crate) fn resource(
        action: &'static str,
        object: &'static str,
        cause: impl std::fmt::Display,
    ) -> Self {
        ProviderError::Resource {
            action,
            object,
            message: cause.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
