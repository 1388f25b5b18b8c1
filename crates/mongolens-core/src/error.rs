//! Error types for MongoLens

use thiserror::Error;

/// Core error type for MongoLens operations
#[derive(Error, Debug)]
pub enum MongolensError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Another connect or disconnect is already in flight.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl MongolensError {
    /// Whether this error is the state machine rejecting a conflicting operation
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type alias for MongoLens operations
pub type Result<T> = std::result::Result<T, MongolensError>;
