//! Nearby product search and the store detail view.
//!
//! A search finds stores within the radius, fuzzy-matches in-stock products
//! of those stores, and orders the joined results by distance. Results are
//! cached under a fingerprint of the request; every search is logged for the
//! trending aggregate without delaying the response.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use nearby_repository::{
    CatalogRepository, RepositoryError, SearchLogRepository, SpatialIndexProvider, StoreHit,
    TextIndexProvider, TextMatchRequest,
};
use nearby_shared::{
    AlternativeStore, GeoPoint, NearbySearchQuery, Product, RankedResult, SearchLog,
    SearchResponse, SearchSource, StoreDetails, StoreDetailsQuery,
};

use crate::cache::{search_key, ResultCache};
use crate::errors::ServiceError;

/// Configuration for the search orchestrator.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Radius used when a query does not specify one, in meters.
    pub default_radius_m: f64,
    /// How long search results stay cached.
    pub cache_ttl: Duration,
    /// Budget for the spatial and text queries of one request.
    pub query_timeout: Duration,
    /// Radius within which alternatives to a store are looked up, in meters.
    pub alternatives_radius_m: f64,
    /// Maximum number of alternative stores.
    pub alternatives_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 5_000.0,
            cache_ttl: Duration::from_secs(60),
            query_timeout: Duration::from_secs(5),
            alternatives_radius_m: 5_000.0,
            alternatives_limit: 5,
        }
    }
}

/// The document store capabilities search depends on.
#[derive(Clone)]
pub struct SearchBackends {
    pub spatial: Arc<dyn SpatialIndexProvider>,
    pub text: Arc<dyn TextIndexProvider>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub search_logs: Arc<dyn SearchLogRepository>,
}

/// Coordinates the spatial index, text index and result cache.
pub struct SearchOrchestrator {
    backends: SearchBackends,
    cache: ResultCache,
    config: SearchConfig,
}

impl SearchOrchestrator {
    /// Create an orchestrator with the default configuration.
    pub fn new(backends: SearchBackends, cache: ResultCache) -> Self {
        Self::with_config(backends, cache, SearchConfig::default())
    }

    /// Create an orchestrator with custom configuration.
    pub fn with_config(backends: SearchBackends, cache: ResultCache, config: SearchConfig) -> Self {
        Self {
            backends,
            cache,
            config,
        }
    }

    /// Search for in-stock products near a location.
    ///
    /// # Arguments
    ///
    /// * `query` - Product name, searcher location and optional radius
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Results ordered by distance, tagged with their source
    /// * `Err(ServiceError)` - `InvalidArgument` for a malformed query, `Timeout`
    ///   if the queries exceed their budget, `Internal` otherwise
    #[instrument(skip(self, query), fields(product_name = %query.product_name))]
    pub async fn search_nearby(
        &self,
        query: &NearbySearchQuery,
    ) -> Result<SearchResponse, ServiceError> {
        query.validate().map_err(ServiceError::invalid_argument)?;
        let center = query.location().map_err(ServiceError::invalid_argument)?;
        let radius = query.radius_or(self.config.default_radius_m);
        let key = search_key(&query.normalized_name(), center, radius);

        if let Some(results) = self.cache.get_json::<Vec<RankedResult>>(&key).await {
            debug!(key = %key, count = results.len(), "Serving search from cache");
            self.log_search(&query.product_name, center);
            return Ok(SearchResponse::new(SearchSource::Cache, results));
        }

        let results = self
            .within_budget(self.rank(center, radius, &query.product_name))
            .await
            .map_err(|e| match e {
                ServiceError::InvalidArgument(_) | ServiceError::Timeout(_) => e,
                other => ServiceError::internal(other.to_string()),
            })?;

        self.cache
            .set_json(&key, &results, self.config.cache_ttl)
            .await;
        self.log_search(&query.product_name, center);

        info!(count = results.len(), radius_m = radius, "Search completed");
        Ok(SearchResponse::new(SearchSource::Db, results))
    }

    /// Show a store's catalog along with nearby alternatives.
    ///
    /// Alternatives are other stores within the configured radius, each shown
    /// with the product best matching `product_name` (or its first product).
    /// Stores without products are omitted. This view is never cached.
    ///
    /// # Returns
    ///
    /// * `Ok(StoreDetails)` - The store, its products and alternatives
    /// * `Err(ServiceError)` - `NotFound` if no store has that exact name
    #[instrument(skip(self, query), fields(store_name = %query.store_name))]
    pub async fn store_details(
        &self,
        query: &StoreDetailsQuery,
    ) -> Result<StoreDetails, ServiceError> {
        query.validate().map_err(ServiceError::invalid_argument)?;
        let center = query.location().map_err(ServiceError::invalid_argument)?;

        self.within_budget(self.collect_store_details(query, center))
            .await
    }

    async fn within_budget<T>(
        &self,
        work: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.config.query_timeout, work).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                warn!(
                    budget_ms = self.config.query_timeout.as_millis() as u64,
                    "Document store queries exceeded their budget"
                );
                Err(ServiceError::Timeout(self.config.query_timeout))
            }
        }
    }

    /// Find, join and order matching products.
    async fn rank(
        &self,
        center: GeoPoint,
        radius: f64,
        product_name: &str,
    ) -> Result<Vec<RankedResult>, RepositoryError> {
        let stores = self
            .backends
            .spatial
            .stores_near(center, radius, None)
            .await?;
        if stores.is_empty() {
            debug!("No stores within radius");
            return Ok(Vec::new());
        }

        let store_ids: Vec<Uuid> = stores.iter().map(|hit| hit.store.id).collect();
        let by_id: HashMap<Uuid, &StoreHit> = stores.iter().map(|hit| (hit.store.id, hit)).collect();

        let request = TextMatchRequest::new(product_name.trim()).in_stores(store_ids);
        let hits = self.backends.text.match_products(&request).await?;

        let mut results: Vec<RankedResult> = hits
            .into_iter()
            .filter(|hit| hit.product.stock > 0)
            .filter_map(|hit| {
                let store_hit = by_id.get(&hit.product.store_id)?;
                if store_hit.distance > radius {
                    return None;
                }
                Some(RankedResult {
                    store_id: store_hit.store.id,
                    store_name: store_hit.store.name.clone(),
                    address: store_hit.store.address.clone(),
                    location: store_hit.store.location,
                    distance: store_hit.distance,
                    product: hit.product.summary(),
                })
            })
            .collect();

        // Stable: equal distances keep the text index order.
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(results)
    }

    async fn collect_store_details(
        &self,
        query: &StoreDetailsQuery,
        center: GeoPoint,
    ) -> Result<StoreDetails, RepositoryError> {
        let catalog = &self.backends.catalog;

        let main_store = catalog
            .find_store_by_name(query.store_name.trim())
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Store not found".to_string()))?;
        let products = catalog.products_for_store(main_store.id).await?;

        let limit = self.config.alternatives_limit;
        let nearby = self
            .backends
            .spatial
            .stores_near(center, self.config.alternatives_radius_m, Some(limit + 1))
            .await?;

        let mut nearby_alternatives = Vec::with_capacity(limit);
        for hit in nearby
            .into_iter()
            .filter(|hit| hit.store.id != main_store.id)
            .take(limit)
        {
            let offered = catalog.products_for_store(hit.store.id).await?;
            if let Some(product) = pick_alternative(&offered, query.product_name.as_deref()) {
                nearby_alternatives.push(AlternativeStore {
                    store: hit.store.summary(),
                    distance: hit.distance,
                    product: product.summary(),
                });
            }
        }

        Ok(StoreDetails {
            main_store,
            products: products.iter().map(Product::summary).collect(),
            nearby_alternatives,
        })
    }

    /// Record the search without waiting for the write.
    fn log_search(&self, term: &str, location: GeoPoint) {
        let search_logs = Arc::clone(&self.backends.search_logs);
        let log = SearchLog::new(term.trim(), location);
        tokio::spawn(async move {
            if let Err(e) = search_logs.record(&log).await {
                warn!(error = %e, "Failed to record search log");
            }
        });
    }
}

/// The product shown for an alternative store.
fn pick_alternative<'a>(products: &'a [Product], wanted: Option<&str>) -> Option<&'a Product> {
    let needle = wanted
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty());

    needle
        .and_then(|needle| {
            products
                .iter()
                .find(|product| product.name.to_lowercase().contains(&needle))
        })
        .or_else(|| products.first())
}
