//! Search query types.
//!
//! This module defines the request structures for nearby product search and for
//! the store detail view.

use serde::{Deserialize, Serialize};

use crate::types::geo::GeoPoint;

/// Nearby product search parameters.
///
/// Mirrors the request body `{productName, lat, lng, radius?}`. Coordinates are
/// optional at the type level so that a missing value is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearbySearchQuery {
    /// The product name to search for.
    /// Supports fuzzy matching and autocomplete.
    #[serde(default)]
    pub product_name: String,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lng: Option<f64>,

    /// Search radius in meters. The configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl NearbySearchQuery {
    /// Create a new query without an explicit radius.
    ///
    /// # Example
    ///
    /// ```
    /// use nearby_shared::NearbySearchQuery;
    ///
    /// let query = NearbySearchQuery::new("widget", 28.0, 77.0).with_radius(2_000.0);
    /// assert!(query.validate().is_ok());
    /// ```
    pub fn new(product_name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            product_name: product_name.into(),
            lat: Some(lat),
            lng: Some(lng),
            radius: None,
        }
    }

    /// Set the search radius in meters.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Validate the query parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.product_name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }

        self.location()?;

        if let Some(radius) = self.radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(format!("Radius must be a positive distance, got {}", radius));
            }
        }

        Ok(())
    }

    /// The searcher's location.
    pub fn location(&self) -> Result<GeoPoint, String> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => GeoPoint::from_lat_lng(lat, lng).map_err(|e| e.to_string()),
            _ => Err("Location (lat and lng) is required".to_string()),
        }
    }

    /// The requested radius, or `default` if none was given.
    pub fn radius_or(&self, default: f64) -> f64 {
        self.radius.unwrap_or(default)
    }

    /// The product name trimmed and lowercased, as used for cache fingerprints.
    pub fn normalized_name(&self) -> String {
        self.product_name.trim().to_lowercase()
    }
}

/// Store detail view parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetailsQuery {
    /// Exact name of the store to show.
    #[serde(default)]
    pub store_name: String,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lng: Option<f64>,

    /// Product the user is looking for, used to pick each alternative's product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl StoreDetailsQuery {
    pub fn new(store_name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            store_name: store_name.into(),
            lat: Some(lat),
            lng: Some(lng),
            product_name: None,
        }
    }

    /// Set the product used to pick alternatives.
    pub fn with_product(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    /// Validate the query parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_name.trim().is_empty() {
            return Err("Store name is required".to_string());
        }
        self.location().map(|_| ())
    }

    pub fn location(&self) -> Result<GeoPoint, String> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => GeoPoint::from_lat_lng(lat, lng).map_err(|e| e.to_string()),
            _ => Err("Location (lat and lng) is required".to_string()),
        }
    }
}
