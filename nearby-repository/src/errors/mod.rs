//! Error types for the nearby repository.
//!
//! This module provides a unified error type for all document store and cache
//! backend operations.

mod repository_error;

pub use repository_error::RepositoryError;
