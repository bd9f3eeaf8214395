//! Notification repository trait definition.

use async_trait::async_trait;
use nearby_shared::{NewNotification, Notification};
use uuid::Uuid;

use crate::errors::RepositoryError;

/// Append-only per-user notification feed.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Append an unread notification and return the stored record.
    async fn append(&self, notification: NewNotification) -> Result<Notification, RepositoryError>;

    /// The user's most recent notifications, newest first.
    async fn list_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// Mark one notification read. Returns false if absent or not owned by `user_id`.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError>;

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, RepositoryError>;

    /// Mark every unread notification of the user read, returning how many changed.
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepositoryError>;
}
