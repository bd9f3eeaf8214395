//! Redis cache backend.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};
use std::time::Duration;
use tracing::info;

use crate::errors::RepositoryError;
use crate::interfaces::CacheBackend;

/// Number of keys requested per `SCAN` round trip during prefix deletion.
const SCAN_BATCH: usize = 500;

impl From<RedisError> for RepositoryError {
    fn from(err: RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            RepositoryError::connection(err.to_string())
        } else {
            RepositoryError::cache(err.to_string())
        }
    }
}

/// Redis-backed cache.
///
/// Holds a single multiplexed connection. The connection is not re-established
/// after it drops; callers treat the resulting errors as cache misses.
pub struct RedisCacheBackend {
    connection: MultiplexedConnection,
}

impl RedisCacheBackend {
    /// Connect to Redis and verify the server answers `PING`.
    ///
    /// # Arguments
    ///
    /// * `url` - The Redis URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Returns
    ///
    /// * `Ok(RedisCacheBackend)` - A connected backend
    /// * `Err(RepositoryError)` - If the URL is invalid or the server is unreachable
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let client =
            redis::Client::open(url).map_err(|e| RepositoryError::connection(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;

        let backend = Self { connection };
        backend.ping().await?;

        info!(url = %url, "Connected to Redis cache");
        Ok(backend)
    }

    fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn ping(&self) -> Result<(), RepositoryError> {
        let mut conn = self.connection();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RepositoryError> {
        let mut conn = self.connection();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, RepositoryError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, RepositoryError> {
        let mut conn = self.connection();
        let pattern = format!("{}*", prefix);
        let mut cursor: u64 = 0;
        let mut removed = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = conn.del(&keys).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}
