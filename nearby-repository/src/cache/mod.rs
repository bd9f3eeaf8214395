//! Cache backends for the result cache.
//!
//! ## Usage
//!
//! ```ignore
//! use nearby_repository::cache::CacheSource;
//!
//! // Development: process-local cache
//! let backend = CacheSource::memory().into_backend().await?;
//!
//! // Production: Redis
//! let backend = CacheSource::redis("redis://127.0.0.1:6379").into_backend().await?;
//! ```

mod memory;
mod redis_backend;

use std::sync::Arc;

use crate::errors::RepositoryError;
use crate::interfaces::CacheBackend;

pub use memory::MemoryCacheBackend;
pub use redis_backend::RedisCacheBackend;

/// Configuration for the cache backend.
///
/// Use this to explicitly choose between no cache, an in-memory cache and Redis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSource {
    /// Run without a cache.
    Disabled,

    /// Use a process-local cache.
    Memory,

    /// Use Redis.
    Redis {
        /// Redis connection URL
        url: String,
    },
}

impl CacheSource {
    pub fn disabled() -> Self {
        Self::Disabled
    }

    pub fn memory() -> Self {
        Self::Memory
    }

    /// Create a Redis cache source with the given URL.
    pub fn redis(url: impl Into<String>) -> Self {
        Self::Redis { url: url.into() }
    }

    /// Connect the selected backend.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - If the cache is disabled
    /// * `Ok(Some(backend))` - A reachable backend
    /// * `Err(RepositoryError)` - If the backend could not be reached
    pub async fn into_backend(self) -> Result<Option<Arc<dyn CacheBackend>>, RepositoryError> {
        match self {
            Self::Disabled => Ok(None),
            Self::Memory => Ok(Some(Arc::new(MemoryCacheBackend::new()))),
            Self::Redis { url } => {
                let backend = RedisCacheBackend::connect(&url).await?;
                Ok(Some(Arc::new(backend)))
            }
        }
    }
}
