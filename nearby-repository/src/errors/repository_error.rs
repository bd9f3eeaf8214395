//! Repository error types.
//!
//! This module defines the unified error type for all repository operations,
//! covering both backend failures and caller errors detected by a backend.

use thiserror::Error;

/// Unified errors from repository operations.
///
/// Used by every collaborator trait in [`crate::interfaces`] so that the service
/// layer can map backend failures onto its own taxonomy in one place.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Validation error (e.g., malformed query parameters).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish or use a connection to the backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write conflicts with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failed to serialize or deserialize a stored value.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A query failed in the backend.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The cache backend failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Unknown error.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RepositoryError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a not found error for a record of the given kind.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", kind, id))
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::CacheError(msg.into())
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}
