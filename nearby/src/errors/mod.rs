//! Error types for the nearby service layer.

use std::time::Duration;

use nearby_repository::RepositoryError;
use nearby_shared::ErrorResponse;
use thiserror::Error;

/// Message returned to callers for failures they cannot act on.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Errors returned by the service operations.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// The request was malformed or failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced record does not exist or is not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation did not finish within its time budget.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The result cache is disabled or unreachable.
    ///
    /// Never surfaced to callers: cache failures degrade to a cache miss.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Any other failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a cache unavailable error.
    pub fn cache_unavailable(msg: impl Into<String>) -> Self {
        Self::CacheUnavailable(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The message safe to show to the caller.
    ///
    /// Internal failures are reported generically so that backend details do
    /// not leak.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidArgument(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Timeout(_) => "Request timed out".to_string(),
            Self::CacheUnavailable(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Build the failure envelope for this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.public_message())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ValidationError(msg) => Self::InvalidArgument(msg),
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        let err: ServiceError = RepositoryError::validation("bad radius").into();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        let err: ServiceError = RepositoryError::not_found("Product", "42").into();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err: ServiceError = RepositoryError::conflict("duplicate").into();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err: ServiceError = RepositoryError::connection("refused").into();
        assert!(matches!(err, ServiceError::Internal(_)));

        let err: ServiceError = RepositoryError::cache("oom").into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_public_message_hides_internal_details() {
        let err = ServiceError::internal("connection refused at 10.0.0.3:27017");
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);

        let response = err.to_response();
        assert!(!response.success);
        assert_eq!(response.message, INTERNAL_ERROR_MESSAGE);

        let err = ServiceError::not_found("Product not found");
        assert_eq!(err.public_message(), "Product not found");

        let err = ServiceError::Timeout(Duration::from_secs(5));
        assert_eq!(err.public_message(), "Request timed out");
    }
}
