//! Text relevance provider trait definition.

use async_trait::async_trait;

use crate::errors::RepositoryError;
use crate::types::{ProductHit, TextMatchRequest};

/// Fuzzy and autocomplete matching over product names.
#[async_trait]
pub trait TextIndexProvider: Send + Sync {
    /// Find products whose name fuzzy-matches the request query.
    ///
    /// Implementations honour the store restriction, the stock filter and the
    /// edit distance carried by `request`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ProductHit>)` - Matches ordered by descending relevance. The
    ///   order is stable for equal scores.
    /// * `Err(RepositoryError)` - If the query fails
    async fn match_products(
        &self,
        request: &TextMatchRequest,
    ) -> Result<Vec<ProductHit>, RepositoryError>;
}
