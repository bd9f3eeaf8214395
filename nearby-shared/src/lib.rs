//! # Nearby Shared
//!
//! This crate defines shared data structures and types used across the nearby
//! product discovery system: the geolocated catalog (stores and products), user
//! intents and notifications, search logs, and the request/response shapes of
//! the search and intent surfaces.

pub mod types;

pub use types::geo::{GeoPoint, InvalidCoordinate};
pub use types::intent::{Intent, IntentKind, IntentMeta, IntentStatus, IntentView, Watermark};
pub use types::notification::{NewNotification, Notification};
pub use types::product::{Product, ProductSummary, ProductUpdate, MAX_PRODUCT_IMAGES};
pub use types::search_log::SearchLog;
pub use types::search_query::{NearbySearchQuery, StoreDetailsQuery};
pub use types::search_result::{
    AlternativeStore, ErrorResponse, IntentListResponse, RankedResult, SearchResponse,
    SearchSource, StoreDetails, StoreDetailsResponse, TrendingProduct, TrendingResponse,
};
pub use types::store::{Store, StoreSummary};
