//! Process-local cache backend.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::errors::RepositoryError;
use crate::interfaces::CacheBackend;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory cache with per-entry expiry.
///
/// Expired entries are dropped lazily when read and whenever a prefix
/// deletion sweeps the map.
#[derive(Default)]
pub struct MemoryCacheBackend {
    entries: DashMap<String, Entry>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RepositoryError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, RepositoryError> {
        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(key) {
                if entry.expires_at > now {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, RepositoryError> {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|key, entry| {
            if entry.expires_at <= now {
                return false;
            }
            if key.starts_with(prefix) {
                removed += 1;
                return false;
            }
            true
        });
        Ok(removed)
    }
}
