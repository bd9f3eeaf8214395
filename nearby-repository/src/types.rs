//! Request and response types for document store queries.

use nearby_shared::{Product, Store};
use uuid::Uuid;

/// Default edit distance tolerated by fuzzy product name matching.
pub const DEFAULT_MAX_EDITS: usize = 1;

/// A store found by a spatial query, with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub store: Store,
    /// Distance in meters.
    pub distance: f64,
}

/// A product matched by a text query, with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductHit {
    pub product: Product,
    /// Higher scores indicate better matches.
    pub score: f64,
}

/// Request to find products whose name fuzzy-matches a query.
#[derive(Debug, Clone)]
pub struct TextMatchRequest {
    /// The text typed by the user.
    pub query: String,
    /// Restrict matches to products owned by these stores. `None` means all stores.
    pub store_ids: Option<Vec<Uuid>>,
    /// Only return products with `stock > 0`.
    pub in_stock_only: bool,
    /// Maximum edit distance per query term.
    pub max_edits: usize,
    /// Maximum number of hits to return.
    pub limit: Option<usize>,
}

impl TextMatchRequest {
    /// Create a request for in-stock products with the default fuzziness.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            store_ids: None,
            in_stock_only: true,
            max_edits: DEFAULT_MAX_EDITS,
            limit: None,
        }
    }

    /// Restrict the match to the given stores.
    pub fn in_stores(mut self, store_ids: Vec<Uuid>) -> Self {
        self.store_ids = Some(store_ids);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
