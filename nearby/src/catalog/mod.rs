//! Store and product mutations.
//!
//! Every successful mutation purges the search and trending caches. Updates
//! that change a product's price or stock are handed to the intent evaluator;
//! neither step can fail the mutation itself.

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use nearby_repository::CatalogRepository;
use nearby_shared::{Product, ProductUpdate, Store};

use crate::cache::CacheInvalidator;
use crate::errors::ServiceError;
use crate::evaluator::EvaluationDispatch;

/// Applies catalog mutations and their side effects.
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    invalidator: CacheInvalidator,
    dispatch: EvaluationDispatch,
}

impl CatalogService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        invalidator: CacheInvalidator,
        dispatch: EvaluationDispatch,
    ) -> Self {
        Self {
            catalog,
            invalidator,
            dispatch,
        }
    }

    /// Register a store.
    #[instrument(skip(self, store), fields(store_name = %store.name))]
    pub async fn add_store(&self, store: Store) -> Result<Store, ServiceError> {
        if store.name.trim().is_empty() {
            return Err(ServiceError::invalid_argument("Store name is required"));
        }
        self.catalog.insert_store(&store).await?;
        self.invalidator.invalidate_all().await;

        info!(store_id = %store.id, "Store added");
        Ok(store)
    }

    /// Add a product to an existing store.
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    pub async fn add_product(&self, product: Product) -> Result<Product, ServiceError> {
        product.validate().map_err(ServiceError::invalid_argument)?;
        if self.catalog.get_store(product.store_id).await?.is_none() {
            return Err(ServiceError::not_found("Store not found"));
        }
        self.catalog.insert_product(&product).await?;
        self.invalidator.invalidate_all().await;

        info!(product_id = %product.id, store_id = %product.store_id, "Product added");
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Arguments
    ///
    /// * `product_id` - The product to update
    /// * `update` - The fields to change
    ///
    /// # Returns
    ///
    /// * `Ok(Product)` - The product after the update
    /// * `Err(ServiceError)` - `NotFound` for an unknown product,
    ///   `InvalidArgument` if the updated product is invalid
    #[instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        update: ProductUpdate,
    ) -> Result<Product, ServiceError> {
        let mut product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product not found"))?;

        let price_or_stock_changed = update.apply(&mut product);
        product.validate().map_err(ServiceError::invalid_argument)?;

        self.catalog.update_product(&product).await?;
        self.invalidator.invalidate_all().await;

        info!(
            product_id = %product.id,
            price = %product.price,
            stock = product.stock,
            "Product updated"
        );

        if price_or_stock_changed {
            self.dispatch.dispatch(product.clone()).await;
        }
        Ok(product)
    }

    /// Delete a product. Intents on it are kept.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        if !self.catalog.delete_product(product_id).await? {
            return Err(ServiceError::not_found("Product not found"));
        }
        self.invalidator.invalidate_all().await;

        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}
