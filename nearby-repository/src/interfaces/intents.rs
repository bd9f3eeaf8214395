//! Intent repository trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nearby_shared::{Intent, Watermark};
use uuid::Uuid;

use crate::errors::RepositoryError;

/// Storage for user intents.
#[async_trait]
pub trait IntentRepository: Send + Sync {
    async fn insert_intent(&self, intent: &Intent) -> Result<(), RepositoryError>;

    async fn get_intent(&self, id: Uuid) -> Result<Option<Intent>, RepositoryError>;

    /// Insert `intent` unless its owner already holds a non-cancelled intent
    /// of the same kind on the same product. Check and insert are one atomic
    /// step.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the intent was inserted
    /// * `Ok(false)` - If an open duplicate already exists
    async fn insert_if_no_open(&self, intent: &Intent) -> Result<bool, RepositoryError>;

    /// All price-drop and stock-change intents on `product_id` that are still
    /// watching (`Active` or `Triggered`).
    async fn watching_product(&self, product_id: Uuid) -> Result<Vec<Intent>, RepositoryError>;

    /// All non-cancelled intents owned by `user_id`, oldest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Intent>, RepositoryError>;

    /// Mark an intent cancelled if it exists, is owned by `user_id` and is not
    /// already cancelled.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the intent was cancelled by this call
    /// * `Ok(false)` - If it is absent, not owned, or already cancelled
    async fn cancel(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError>;

    /// Compare-and-set the notification watermark of an intent.
    ///
    /// The write applies only if the stored watermark for `next`'s kind still
    /// equals `expected` and the intent is not cancelled. On success the intent
    /// status becomes `Triggered`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the watermark was advanced
    /// * `Ok(false)` - If another writer got there first or the intent is gone
    async fn advance_watermark(
        &self,
        id: Uuid,
        expected: Option<Watermark>,
        next: Watermark,
    ) -> Result<bool, RepositoryError>;

    /// Undo an `advance_watermark` whose notification could not be delivered.
    ///
    /// Applies only while the stored watermark for `applied`'s kind still
    /// equals `applied`. The watermark returns to `previous`, and an intent
    /// that had never notified before goes back to `Active`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the watermark was rewound
    /// * `Ok(false)` - If the intent moved on, was cancelled, or is gone
    async fn rewind_watermark(
        &self,
        id: Uuid,
        applied: Watermark,
        previous: Option<Watermark>,
    ) -> Result<bool, RepositoryError>;

    /// Permanently delete `user_id`'s reservations whose expiry is at or before `now`.
    ///
    /// Returns the number of deleted intents.
    async fn delete_expired_reservations(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}
