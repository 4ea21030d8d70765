//! Error types for chainsmith-state

use thiserror::Error;

/// Errors that can occur in the registry persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Registry connection failed: {0}")]
    Connection(String),

    /// Backend query or write error
    #[error("Registry backend error: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A logical name was already recorded with an identical record.
    /// The registry is write-once; this signals a repeated write.
    #[error("Component '{name}' is already recorded")]
    AlreadyRecorded { name: String },

    /// A logical name was already recorded with a *different* record.
    /// Indicates an inconsistent or concurrently modified registry.
    #[error("Component '{name}' is recorded with a conflicting value")]
    RecordConflict { name: String },

    /// A stored address could not be parsed back into an `Address`.
    #[error("Invalid address in registry: {value}")]
    InvalidAddress { value: String },

    /// A stored proxy kind was not recognized.
    #[error("Unknown proxy kind in registry: {value}")]
    UnknownProxyKind { value: String },
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
