use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate {kind} \"{address}\"")]
    Duplicate { kind: &'static str, address: String },

    #[error("{field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: String,
    },

    #[error("Error reading {field}: {message}")]
    Read { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
