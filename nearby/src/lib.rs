//! # Nearby
//!
//! Nearby product discovery and intent notifications for a local-commerce
//! marketplace.
//!
//! ## Architecture
//!
//! The service layer sits between an outer request surface and two
//! collaborators, a document store and an optional result cache:
//!
//! 1. **Search**: Ranks in-stock products at nearby stores by distance
//! 2. **Intents**: Records reservations and price/stock watches
//! 3. **Evaluator**: Re-evaluates watches whenever a product changes
//! 4. **Catalog**: Product mutations, which invalidate caches and trigger evaluation
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`cache`]: Result cache and invalidation
//! - [`search`]: Nearby search and store details
//! - [`intents`]: Intent ledger
//! - [`evaluator`]: Intent evaluation and the evaluation worker
//! - [`catalog`]: Store and product mutations
//! - [`notifications`]: Per-user notification feed
//! - [`trending`]: Most searched product terms
//! - [`errors`]: Error types for the service layer

pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod intents;
pub mod notifications;
pub mod search;
pub mod trending;

pub use config::{Dependencies, Settings};
pub use errors::ServiceError;

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum NearbyError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Service error.
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),
}

impl NearbyError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
