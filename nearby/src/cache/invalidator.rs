//! Cache invalidation after catalog mutations.

use tracing::{debug, instrument};

use super::{ResultCache, SEARCH_KEY_PREFIX, TRENDING_KEY};

/// Purges cached answers that a mutation may have made stale.
///
/// Invalidation is coarse: every search entry is dropped, whatever product or
/// store it was computed from. Both operations are no-ops on a disabled cache.
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: ResultCache,
}

impl CacheInvalidator {
    pub fn new(cache: ResultCache) -> Self {
        Self { cache }
    }

    /// Delete every search result entry. Returns the number of keys removed.
    #[instrument(skip(self))]
    pub async fn invalidate_search_caches(&self) -> u64 {
        let removed = self.cache.delete_by_prefix(SEARCH_KEY_PREFIX).await;
        debug!(removed, "Invalidated search caches");
        removed
    }

    /// Delete the trending products aggregate.
    #[instrument(skip(self))]
    pub async fn invalidate_trending_cache(&self) -> u64 {
        self.cache.delete(&[TRENDING_KEY.to_string()]).await
    }

    /// Invalidate both namespaces.
    pub async fn invalidate_all(&self) {
        self.invalidate_search_caches().await;
        self.invalidate_trending_cache().await;
    }
}
