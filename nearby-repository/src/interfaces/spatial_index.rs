//! Spatial index provider trait definition.

use async_trait::async_trait;
use nearby_shared::GeoPoint;

use crate::errors::RepositoryError;
use crate::types::StoreHit;

/// Nearest-neighbour queries over store locations.
#[async_trait]
pub trait SpatialIndexProvider: Send + Sync {
    /// Find stores within `radius_m` meters of `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - The query point
    /// * `radius_m` - Maximum distance in meters (inclusive)
    /// * `limit` - Maximum number of stores to return, nearest first
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<StoreHit>)` - Stores sorted by ascending distance
    /// * `Err(RepositoryError)` - If the query fails
    async fn stores_near(
        &self,
        center: GeoPoint,
        radius_m: f64,
        limit: Option<usize>,
    ) -> Result<Vec<StoreHit>, RepositoryError>;
}
