//! Error types for the rearm restart registry.
//!
//! Errors are organized by subsystem: the key-value store, the registry
//! policy layer, and the service launcher. Registry errors carry the store
//! error that caused them.

use thiserror::Error;

/// Errors raised by a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The persisted document exists but cannot be parsed
    #[error("Store is corrupt: {0}")]
    Corrupt(String),

    /// The store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors raised by the restart registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registration request violates a precondition
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    /// The store rejected or failed a write
    #[error("Persistence write failed: {0}")]
    PersistenceWrite(#[source] StoreError),

    /// The store failed a read
    #[error("Persistence read failed: {0}")]
    PersistenceRead(#[source] StoreError),

    /// The stored record cannot be interpreted as a registration
    #[error("Malformed registration record: {0}")]
    MalformedRecord(String),
}

/// Errors raised while resuming a service.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The service process could not be started
    #[error("Failed to start service {service}: {reason}")]
    SpawnFailed {
        /// Service identifier
        service: String,

        /// Failure reason
        reason: String,
    },

    /// The service ran in the foreground and exited unsuccessfully
    #[error("Service {service} exited with status {code:?}")]
    ExitFailure {
        /// Service identifier
        service: String,

        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// The launcher declined to start the service
    #[error("Launch rejected: {0}")]
    Rejected(String),
}
