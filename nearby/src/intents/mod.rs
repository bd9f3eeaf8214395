//! Intent ledger: reservations and price/stock watches.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use nearby_repository::{CatalogRepository, IntentRepository};
use nearby_shared::{
    Intent, IntentKind, IntentView, NewNotification, Product, ProductSummary, StoreSummary,
};

use crate::errors::ServiceError;
use crate::notifications::{store_link, NotificationFeed};

/// Title of every creation acknowledgement.
pub const ACKNOWLEDGEMENT_TITLE: &str = "You're all set";

/// Configuration for the intent ledger.
#[derive(Debug, Clone)]
pub struct IntentConfig {
    /// Lifetime of a reservation.
    pub reserve_ttl: Duration,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            reserve_ttl: Duration::from_secs(2 * 24 * 60 * 60),
        }
    }
}

/// Acknowledgement message for a newly created intent.
pub fn acknowledgement_message(kind: IntentKind) -> &'static str {
    match kind {
        IntentKind::PriceDrop => "We'll notify you when the price drops",
        IntentKind::StockChange => "We'll notify you if stock changes",
        IntentKind::Reserve => "Product reserved successfully",
    }
}

/// Creates, cancels and lists user intents.
pub struct IntentLedger {
    catalog: Arc<dyn CatalogRepository>,
    intents: Arc<dyn IntentRepository>,
    feed: NotificationFeed,
    config: IntentConfig,
}

impl IntentLedger {
    /// Create a ledger with the default configuration.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        intents: Arc<dyn IntentRepository>,
        feed: NotificationFeed,
    ) -> Self {
        Self::with_config(catalog, intents, feed, IntentConfig::default())
    }

    /// Create a ledger with custom configuration.
    pub fn with_config(
        catalog: Arc<dyn CatalogRepository>,
        intents: Arc<dyn IntentRepository>,
        feed: NotificationFeed,
        config: IntentConfig,
    ) -> Self {
        Self {
            catalog,
            intents,
            feed,
            config,
        }
    }

    /// Register a user's interest in a product.
    ///
    /// The product's current price and stock are snapshotted as the reference
    /// for later evaluation. Reservations expire after the configured lifetime.
    /// The user is sent an acknowledgement; failing to send it does not undo
    /// the intent.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owner of the intent
    /// * `store_id` - The store offering the product
    /// * `product_id` - The product of interest
    /// * `kind` - Reservation or watch kind
    ///
    /// # Returns
    ///
    /// * `Ok(Intent)` - The persisted intent
    /// * `Err(ServiceError)` - `NotFound` for an unknown product, `Conflict` if
    ///   the user already has an open intent of this kind on the product
    #[instrument(skip(self))]
    pub async fn create_intent(
        &self,
        user_id: Uuid,
        store_id: Uuid,
        product_id: Uuid,
        kind: IntentKind,
    ) -> Result<Intent, ServiceError> {
        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product not found"))?;

        if product.store_id != store_id {
            return Err(ServiceError::invalid_argument(
                "Product is not sold by this store",
            ));
        }

        let reserve_ttl = chrono::Duration::from_std(self.config.reserve_ttl)
            .map_err(|e| ServiceError::internal(format!("Invalid reservation lifetime: {}", e)))?;
        let intent = Intent::new(user_id, store_id, &product, kind, reserve_ttl, Utc::now());

        if !self.intents.insert_if_no_open(&intent).await? {
            debug!(product_id = %product_id, "Open intent already exists");
            return Err(ServiceError::conflict(format!(
                "An open {} intent already exists for this product",
                kind
            )));
        }

        let acknowledgement = NewNotification::new(
            user_id,
            ACKNOWLEDGEMENT_TITLE,
            acknowledgement_message(kind),
            store_link(store_id),
        );
        if let Err(e) = self.feed.notify(acknowledgement).await {
            warn!(intent_id = %intent.id, error = %e, "Failed to send intent acknowledgement");
        }

        info!(intent_id = %intent.id, kind = %kind, "Intent created");
        Ok(intent)
    }

    /// Cancel one of the user's open intents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The intent is now cancelled
    /// * `Err(ServiceError::NotFound)` - If the intent does not exist, is not
    ///   owned by `user_id`, or is no longer open
    #[instrument(skip(self))]
    pub async fn cancel_intent(&self, intent_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        if !self.intents.cancel(intent_id, user_id).await? {
            return Err(ServiceError::not_found("Intent not found"));
        }
        info!(intent_id = %intent_id, "Intent cancelled");
        Ok(())
    }

    /// List the user's open intents with product and store summaries.
    ///
    /// Expired reservations of the user are deleted first.
    #[instrument(skip(self))]
    pub async fn list_my_intents(&self, user_id: Uuid) -> Result<Vec<IntentView>, ServiceError> {
        let reaped = self
            .intents
            .delete_expired_reservations(user_id, Utc::now())
            .await?;
        if reaped > 0 {
            info!(reaped, "Reaped expired reservations");
        }

        let intents = self.intents.list_for_user(user_id).await?;

        let mut products: HashMap<Uuid, Option<ProductSummary>> = HashMap::new();
        let mut stores: HashMap<Uuid, Option<StoreSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(intents.len());

        for intent in intents {
            if !products.contains_key(&intent.product_id) {
                let summary = self
                    .catalog
                    .get_product(intent.product_id)
                    .await?
                    .as_ref()
                    .map(Product::summary);
                products.insert(intent.product_id, summary);
            }
            if !stores.contains_key(&intent.store_id) {
                let summary = self
                    .catalog
                    .get_store(intent.store_id)
                    .await?
                    .map(|store| store.summary());
                stores.insert(intent.store_id, summary);
            }

            views.push(IntentView {
                product: products.get(&intent.product_id).cloned().flatten(),
                store: stores.get(&intent.store_id).cloned().flatten(),
                intent,
            });
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledgement_messages() {
        assert_eq!(
            acknowledgement_message(IntentKind::PriceDrop),
            "We'll notify you when the price drops"
        );
        assert_eq!(
            acknowledgement_message(IntentKind::StockChange),
            "We'll notify you if stock changes"
        );
        assert_eq!(
            acknowledgement_message(IntentKind::Reserve),
            "Product reserved successfully"
        );
    }

    #[test]
    fn test_default_reservation_lifetime_is_two_days() {
        assert_eq!(
            IntentConfig::default().reserve_ttl,
            Duration::from_secs(172_800)
        );
    }
}
