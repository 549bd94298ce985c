//! FortiOS client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Authentication failed (HTTP {0}): check the API token and trusted hosts")]
    Unauthorized(u16),

    #[error("FortiOS API error (HTTP {http_status}): {message}")]
    Api {
        http_status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
