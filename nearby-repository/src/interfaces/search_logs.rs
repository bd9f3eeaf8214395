//! Search log repository trait definition.

use async_trait::async_trait;
use nearby_shared::{SearchLog, TrendingProduct};

use crate::errors::RepositoryError;

/// Append-only analytics log of search terms.
#[async_trait]
pub trait SearchLogRepository: Send + Sync {
    /// Record one search.
    async fn record(&self, log: &SearchLog) -> Result<(), RepositoryError>;

    /// Most searched terms (case-insensitive), by count descending then term ascending.
    async fn top_terms(&self, limit: usize) -> Result<Vec<TrendingProduct>, RepositoryError>;
}
