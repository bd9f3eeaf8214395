//! Most searched product terms.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use nearby_repository::SearchLogRepository;
use nearby_shared::{SearchSource, TrendingProduct, TrendingResponse};

use crate::cache::{ResultCache, TRENDING_KEY};
use crate::errors::ServiceError;

/// Number of terms in the trending list.
pub const TRENDING_LIMIT: usize = 10;

/// Aggregates search logs into a cached trending list.
pub struct TrendingService {
    search_logs: Arc<dyn SearchLogRepository>,
    cache: ResultCache,
    ttl: Duration,
}

impl TrendingService {
    pub fn new(search_logs: Arc<dyn SearchLogRepository>, cache: ResultCache, ttl: Duration) -> Self {
        Self {
            search_logs,
            cache,
            ttl,
        }
    }

    /// The most searched terms, most frequent first.
    #[instrument(skip(self))]
    pub async fn top_products(&self) -> Result<TrendingResponse, ServiceError> {
        if let Some(data) = self.cache.get_json::<Vec<TrendingProduct>>(TRENDING_KEY).await {
            return Ok(TrendingResponse {
                success: true,
                source: SearchSource::Cache,
                data,
            });
        }

        let data = self.search_logs.top_terms(TRENDING_LIMIT).await?;
        debug!(terms = data.len(), "Aggregated trending products");
        self.cache.set_json(TRENDING_KEY, &data, self.ttl).await;

        Ok(TrendingResponse {
            success: true,
            source: SearchSource::Db,
            data,
        })
    }
}
