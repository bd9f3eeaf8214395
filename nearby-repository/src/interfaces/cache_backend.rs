//! Cache backend trait definition.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::RepositoryError;

/// Key/value store with per-entry expiry backing the result cache.
///
/// Every error returned here is treated by callers as a cache miss or a no-op.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Get a live value. Expired entries are never returned.
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RepositoryError>;

    /// Delete the given keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, RepositoryError>;

    /// Delete every key starting with `prefix`, returning how many existed.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, RepositoryError>;
}
