//! Catalog repository trait definition.

use async_trait::async_trait;
use nearby_shared::{Product, Store};
use uuid::Uuid;

use crate::errors::RepositoryError;

/// CRUD access to stores and products.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Persist a new store. Fails with `Conflict` if the id is taken.
    async fn insert_store(&self, store: &Store) -> Result<(), RepositoryError>;

    async fn get_store(&self, id: Uuid) -> Result<Option<Store>, RepositoryError>;

    /// Resolve a store by its exact name.
    async fn find_store_by_name(&self, name: &str) -> Result<Option<Store>, RepositoryError>;

    /// Persist a new product. Fails with `Conflict` if the id is taken.
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;

    /// Replace a stored product. Fails with `NotFound` if it does not exist.
    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Delete a product, returning whether it existed.
    async fn delete_product(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// All products owned by a store, in insertion order.
    async fn products_for_store(&self, store_id: Uuid) -> Result<Vec<Product>, RepositoryError>;
}
