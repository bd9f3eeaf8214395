//! Result cache and cache invalidation.
//!
//! The [`ResultCache`] wraps an optional [`CacheBackend`]. A missing backend
//! behaves as a cache that always misses, and backend failures are logged and
//! treated the same way, so callers never see a cache error. Every round-trip
//! is bounded by a short timeout; a backend that does not answer in time
//! counts as failed.

mod invalidator;

pub use invalidator::CacheInvalidator;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use nearby_repository::{CacheBackend, CacheSource, RepositoryError};
use nearby_shared::GeoPoint;

use crate::errors::ServiceError;

/// Namespace of all search result entries.
pub const SEARCH_KEY_PREFIX: &str = "search:";

/// Key of the trending products aggregate.
pub const TRENDING_KEY: &str = "trending:products";

/// Default budget for one cache round-trip.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

/// Budget for establishing the backend connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache key for a nearby search.
///
/// The product name is expected to be normalized already (trimmed and
/// lowercased). Coordinates are fixed to six decimals so that equal requests
/// map to the same key.
///
/// # Example
///
/// ```
/// use nearby::cache::search_key;
/// use nearby_shared::GeoPoint;
///
/// let center = GeoPoint::from_lat_lng(28.0, 77.0).unwrap();
/// assert_eq!(
///     search_key("blue widget", center, 5000.0),
///     "search:blue widget:28.000000:77.000000:5000"
/// );
/// ```
pub fn search_key(normalized_name: &str, center: GeoPoint, radius_m: f64) -> String {
    format!(
        "{}{}:{:.6}:{:.6}:{:.0}",
        SEARCH_KEY_PREFIX,
        normalized_name,
        center.lat(),
        center.lng(),
        radius_m
    )
}

/// Optional, failure-tolerant result cache.
#[derive(Clone)]
pub struct ResultCache {
    backend: Option<Arc<dyn CacheBackend>>,
    timeout: Duration,
}

impl ResultCache {
    /// Create a cache over the given backend, or a disabled cache for `None`.
    pub fn new(backend: Option<Arc<dyn CacheBackend>>) -> Self {
        Self::with_timeout(backend, DEFAULT_CACHE_TIMEOUT)
    }

    /// Create a cache whose round-trips give up after `timeout`.
    pub fn with_timeout(backend: Option<Arc<dyn CacheBackend>>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Create a cache that always misses.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Connect the configured backend once.
    ///
    /// If the backend cannot be reached the cache is disabled for the lifetime
    /// of the returned value; no reconnection is attempted.
    ///
    /// # Arguments
    ///
    /// * `source` - The backend to connect
    /// * `op_timeout` - Budget for each later cache round-trip
    pub async fn connect(source: CacheSource, op_timeout: Duration) -> Self {
        let connected = match timeout(CONNECT_TIMEOUT, source.clone().into_backend()).await {
            Ok(result) => result,
            Err(_) => Err(RepositoryError::connection(format!(
                "no connection within {:?}",
                CONNECT_TIMEOUT
            ))),
        };

        match connected {
            Ok(Some(backend)) => {
                info!(source = ?source, timeout = ?op_timeout, "Result cache enabled");
                Self::with_timeout(Some(backend), op_timeout)
            }
            Ok(None) => {
                info!("Result cache disabled by configuration");
                Self::disabled()
            }
            Err(e) => {
                warn!(
                    source = ?source,
                    error = %e,
                    "Cache backend unreachable, running without result cache"
                );
                Self::disabled()
            }
        }
    }

    /// Returns true if a backend is attached.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Read and deserialize a cached value. Any failure is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }
        let raw = match self.try_get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.delete(&[key.to_string()]).await;
                None
            }
        }
    }

    /// Serialize and store a value. Failures are logged and ignored.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        if !self.is_enabled() {
            return;
        }
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.try_set(key, &raw, ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Delete the given keys. Returns the number of keys removed.
    pub async fn delete(&self, keys: &[String]) -> u64 {
        let Ok(backend) = self.backend() else {
            return 0;
        };
        self.bounded(backend.delete(keys)).await.unwrap_or_else(|e| {
            warn!(error = %e, "Cache delete failed");
            0
        })
    }

    /// Delete every key under `prefix`. Returns the number of keys removed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> u64 {
        let Ok(backend) = self.backend() else {
            return 0;
        };
        self.bounded(backend.delete_by_prefix(prefix))
            .await
            .unwrap_or_else(|e| {
                warn!(prefix = %prefix, error = %e, "Cache prefix delete failed");
                0
            })
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        self.bounded(self.backend()?.get(key)).await
    }

    async fn try_set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ServiceError> {
        self.bounded(self.backend()?.set(key, value, ttl)).await
    }

    /// Run one backend call within the round-trip budget.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        match timeout(self.timeout, call).await {
            Ok(result) => result.map_err(Self::unavailable),
            Err(_) => Err(ServiceError::cache_unavailable(format!(
                "no answer within {:?}",
                self.timeout
            ))),
        }
    }

    fn backend(&self) -> Result<&Arc<dyn CacheBackend>, ServiceError> {
        self.backend
            .as_ref()
            .ok_or_else(|| ServiceError::cache_unavailable("result cache disabled"))
    }

    fn unavailable(err: RepositoryError) -> ServiceError {
        ServiceError::cache_unavailable(err.to_string())
    }
}
