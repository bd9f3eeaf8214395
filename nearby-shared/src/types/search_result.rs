//! Search result types.
//!
//! This module defines the response structures returned from search, store
//! detail, trending and intent listing operations, including the JSON
//! envelopes an HTTP layer returns as-is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::geo::GeoPoint;
use crate::types::intent::IntentView;
use crate::types::product::ProductSummary;
use crate::types::store::{Store, StoreSummary};

/// Where a result set came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Served from the result cache.
    Cache,
    /// Computed from the document store.
    Db,
}

/// A single nearby search result: one in-stock product at one store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub store_id: Uuid,
    pub store_name: String,
    pub address: String,
    pub location: GeoPoint,
    /// Distance from the searcher to the store in meters.
    pub distance: f64,
    pub product: ProductSummary,
}

/// Complete nearby search response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub source: SearchSource,
    /// Number of entries in `data`.
    pub count: usize,
    /// Results ordered by distance, nearest first.
    pub data: Vec<RankedResult>,
}

impl SearchResponse {
    /// Create a successful response.
    pub fn new(source: SearchSource, data: Vec<RankedResult>) -> Self {
        Self {
            success: true,
            source,
            count: data.len(),
            data,
        }
    }

    /// Create an empty response computed from the document store.
    pub fn empty() -> Self {
        Self::new(SearchSource::Db, Vec::new())
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of results in this response.
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// A nearby store offered as an alternative on the store detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeStore {
    pub store: StoreSummary,
    /// Distance from the requester in meters.
    pub distance: f64,
    /// The product best matching the requested name, or the store's first product.
    pub product: ProductSummary,
}

/// Store detail view: the store, its full catalog and nearby alternatives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetails {
    pub main_store: Store,
    pub products: Vec<ProductSummary>,
    pub nearby_alternatives: Vec<AlternativeStore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreDetailsResponse {
    pub success: bool,
    pub data: StoreDetails,
}

impl From<StoreDetails> for StoreDetailsResponse {
    fn from(data: StoreDetails) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A frequently searched product term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingProduct {
    pub product_name: String,
    pub searches: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingResponse {
    pub success: bool,
    pub source: SearchSource,
    pub data: Vec<TrendingProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentListResponse {
    pub success: bool,
    pub intents: Vec<IntentView>,
}

impl From<Vec<IntentView>> for IntentListResponse {
    fn from(intents: Vec<IntentView>) -> Self {
        Self {
            success: true,
            intents,
        }
    }
}

/// Failure envelope. Never carries partial data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
