//! In-memory document store.
//!
//! Implements every data collaborator trait over process-local collections.
//! Spatial queries compute spherical distances directly and text queries use
//! the fuzzy matcher in [`crate::text`]; both scan their collection, which is
//! fine for development, tests and small catalogs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nearby_shared::{
    GeoPoint, Intent, IntentStatus, NewNotification, Notification, Product, SearchLog,
    Store, TrendingProduct, Watermark,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use uuid::Uuid;

use crate::errors::RepositoryError;
use crate::interfaces::{
    CatalogRepository, IntentRepository, NotificationRepository, SearchLogRepository,
    SpatialIndexProvider, TextIndexProvider,
};
use crate::text::fuzzy_score;
use crate::types::{ProductHit, StoreHit, TextMatchRequest};

/// In-memory storage backend for development and testing.
///
/// Records keep their insertion order so that ties in distance or relevance
/// resolve the same way on every query.
#[derive(Default)]
pub struct MemoryDocumentStore {
    stores: RwLock<Vec<Store>>,
    products: RwLock<Vec<Product>>,
    intents: RwLock<Vec<Intent>>,
    notifications: RwLock<Vec<Notification>>,
    search_logs: RwLock<Vec<SearchLog>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, RepositoryError> {
    lock.read()
        .map_err(|_| RepositoryError::unknown("document store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, RepositoryError> {
    lock.write()
        .map_err(|_| RepositoryError::unknown("document store lock poisoned"))
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpatialIndexProvider for MemoryDocumentStore {
    async fn stores_near(
        &self,
        center: GeoPoint,
        radius_m: f64,
        limit: Option<usize>,
    ) -> Result<Vec<StoreHit>, RepositoryError> {
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(RepositoryError::validation(format!(
                "radius must be a non-negative distance, got {}",
                radius_m
            )));
        }

        let stores = read(&self.stores)?;
        let mut hits: Vec<StoreHit> = stores
            .iter()
            .filter_map(|store| {
                let distance = center.distance_meters(&store.location);
                (distance <= radius_m).then(|| StoreHit {
                    store: store.clone(),
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        if let Some(limit) = limit {
            hits.truncate(limit);
        }

        debug!(radius_m, found = hits.len(), "Spatial query completed");
        Ok(hits)
    }
}

#[async_trait]
impl TextIndexProvider for MemoryDocumentStore {
    async fn match_products(
        &self,
        request: &TextMatchRequest,
    ) -> Result<Vec<ProductHit>, RepositoryError> {
        if request.query.trim().is_empty() {
            return Err(RepositoryError::validation("text query cannot be empty"));
        }

        let products = read(&self.products)?;
        let mut hits: Vec<ProductHit> = products
            .iter()
            .filter(|product| {
                request
                    .store_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&product.store_id))
            })
            .filter(|product| !request.in_stock_only || product.stock > 0)
            .filter_map(|product| {
                fuzzy_score(&request.query, &product.name, request.max_edits).map(|score| {
                    ProductHit {
                        product: product.clone(),
                        score,
                    }
                })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        if let Some(limit) = request.limit {
            hits.truncate(limit);
        }

        debug!(query = %request.query, matched = hits.len(), "Text query completed");
        Ok(hits)
    }
}

#[async_trait]
impl CatalogRepository for MemoryDocumentStore {
    async fn insert_store(&self, store: &Store) -> Result<(), RepositoryError> {
        let mut stores = write(&self.stores)?;
        if stores.iter().any(|s| s.id == store.id) {
            return Err(RepositoryError::conflict(format!("store {} already exists", store.id)));
        }
        stores.push(store.clone());
        Ok(())
    }

    async fn get_store(&self, id: Uuid) -> Result<Option<Store>, RepositoryError> {
        let stores = read(&self.stores)?;
        Ok(stores.iter().find(|s| s.id == id).cloned())
    }

    async fn find_store_by_name(&self, name: &str) -> Result<Option<Store>, RepositoryError> {
        let stores = read(&self.stores)?;
        Ok(stores.iter().find(|s| s.name == name).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = write(&self.products)?;
        if products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        products.push(product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let products = read(&self.products)?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = write(&self.products)?;
        let stored = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| RepositoryError::not_found("product", product.id))?;
        *stored = product.clone();
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut products = write(&self.products)?;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    async fn products_for_store(&self, store_id: Uuid) -> Result<Vec<Product>, RepositoryError> {
        let products = read(&self.products)?;
        Ok(products
            .iter()
            .filter(|p| p.store_id == store_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IntentRepository for MemoryDocumentStore {
    async fn insert_intent(&self, intent: &Intent) -> Result<(), RepositoryError> {
        let mut intents = write(&self.intents)?;
        if intents.iter().any(|i| i.id == intent.id) {
            return Err(RepositoryError::conflict(format!("intent {} already exists", intent.id)));
        }
        intents.push(intent.clone());
        Ok(())
    }

    async fn get_intent(&self, id: Uuid) -> Result<Option<Intent>, RepositoryError> {
        let intents = read(&self.intents)?;
        Ok(intents.iter().find(|i| i.id == id).cloned())
    }

    async fn insert_if_no_open(&self, intent: &Intent) -> Result<bool, RepositoryError> {
        let mut intents = write(&self.intents)?;
        let duplicate = intents.iter().any(|i| {
            i.user_id == intent.user_id
                && i.product_id == intent.product_id
                && i.kind == intent.kind
                && i.status.is_open()
        });
        if duplicate {
            return Ok(false);
        }
        if intents.iter().any(|i| i.id == intent.id) {
            return Err(RepositoryError::conflict(format!("intent {} already exists", intent.id)));
        }
        intents.push(intent.clone());
        Ok(true)
    }

    async fn watching_product(&self, product_id: Uuid) -> Result<Vec<Intent>, RepositoryError> {
        let intents = read(&self.intents)?;
        Ok(intents
            .iter()
            .filter(|i| i.product_id == product_id && i.kind.is_watch() && i.status.is_open())
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Intent>, RepositoryError> {
        let intents = read(&self.intents)?;
        Ok(intents
            .iter()
            .filter(|i| i.user_id == user_id && i.status.is_open())
            .cloned()
            .collect())
    }

    async fn cancel(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut intents = write(&self.intents)?;
        match intents
            .iter_mut()
            .find(|i| i.id == id && i.user_id == user_id && i.status.is_open())
        {
            Some(intent) => {
                intent.status = IntentStatus::Cancelled;
                intent.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn advance_watermark(
        &self,
        id: Uuid,
        expected: Option<Watermark>,
        next: Watermark,
    ) -> Result<bool, RepositoryError> {
        let mut intents = write(&self.intents)?;
        let Some(intent) = intents.iter_mut().find(|i| i.id == id && i.status.is_open()) else {
            return Ok(false);
        };

        if intent.meta.last_notified(intent.kind) != expected {
            return Ok(false);
        }

        intent.meta.record(next);
        intent.status = IntentStatus::Triggered;
        intent.updated_at = Utc::now();
        Ok(true)
    }

    async fn rewind_watermark(
        &self,
        id: Uuid,
        applied: Watermark,
        previous: Option<Watermark>,
    ) -> Result<bool, RepositoryError> {
        let mut intents = write(&self.intents)?;
        let Some(intent) = intents.iter_mut().find(|i| i.id == id && i.status.is_open()) else {
            return Ok(false);
        };

        if intent.meta.last_notified(intent.kind) != Some(applied) {
            return Ok(false);
        }

        intent.meta.restore(intent.kind, previous);
        if previous.is_none() {
            intent.status = IntentStatus::Active;
        }
        intent.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_expired_reservations(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut intents = write(&self.intents)?;
        let before = intents.len();
        intents.retain(|i| !(i.user_id == user_id && i.is_expired(now)));
        Ok(before - intents.len())
    }
}

#[async_trait]
impl NotificationRepository for MemoryDocumentStore {
    async fn append(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let stored = notification.into_notification(Utc::now());
        write(&self.notifications)?.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = read(&self.notifications)?;
        // Appends are chronological, so reverse insertion order is newest first.
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut notifications = write(&self.notifications)?;
        match notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let notifications = read(&self.notifications)?;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as u64)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let mut notifications = write(&self.notifications)?;
        let mut updated = 0;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl SearchLogRepository for MemoryDocumentStore {
    async fn record(&self, log: &SearchLog) -> Result<(), RepositoryError> {
        write(&self.search_logs)?.push(log.clone());
        Ok(())
    }

    async fn top_terms(&self, limit: usize) -> Result<Vec<TrendingProduct>, RepositoryError> {
        let logs = read(&self.search_logs)?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for log in logs.iter() {
            let term = log.product_name.trim().to_lowercase();
            if !term.is_empty() {
                *counts.entry(term).or_default() += 1;
            }
        }

        let mut trending: Vec<TrendingProduct> = counts
            .into_iter()
            .map(|(product_name, searches)| TrendingProduct {
                product_name,
                searches,
            })
            .collect();
        trending.sort_by(|a, b| {
            b.searches
                .cmp(&a.searches)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        trending.truncate(limit);

        Ok(trending)
    }
}
