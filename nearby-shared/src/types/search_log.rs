//! Search log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::geo::GeoPoint;

/// Analytic record of a single search. Append-only.
///
/// Only the trending aggregation reads these; the search path never does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchLog {
    /// The raw search term as typed.
    pub product_name: String,
    pub user_location: GeoPoint,
    pub searched_at: DateTime<Utc>,
}

impl SearchLog {
    pub fn new(product_name: impl Into<String>, user_location: GeoPoint) -> Self {
        Self {
            product_name: product_name.into(),
            user_location,
            searched_at: Utc::now(),
        }
    }
}
