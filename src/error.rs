//! Error types for the expiring map
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for map operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key is absent, was deleted, or has expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid or contradictory construction options
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Failure reported by the remote backend
    #[error("Backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// Value could not be encoded for the remote backend
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true for the not-found condition, regardless of message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for map operations.
pub type Result<T> = std::result::Result<T, StoreError>;
