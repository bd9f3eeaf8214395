//! Per-user notification feed.

use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use nearby_repository::NotificationRepository;
use nearby_shared::{NewNotification, Notification};

use crate::errors::ServiceError;

/// Number of notifications returned by [`NotificationFeed::list`].
pub const FEED_PAGE_SIZE: usize = 30;

/// Link to a store page, attached to intent notifications.
pub fn store_link(store_id: Uuid) -> String {
    format!("/store/{}", store_id)
}

/// Writes and reads user notifications.
#[derive(Clone)]
pub struct NotificationFeed {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationFeed {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// Append an unread notification.
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id))]
    pub async fn notify(&self, notification: NewNotification) -> Result<Notification, ServiceError> {
        let stored = self.repository.append(notification).await?;
        debug!(notification_id = %stored.id, title = %stored.title, "Notification sent");
        Ok(stored)
    }

    /// The user's most recent notifications, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.repository.list_recent(user_id, FEED_PAGE_SIZE).await?)
    }

    /// Mark one of the user's notifications as read.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The notification is read
    /// * `Err(ServiceError::NotFound)` - If it does not exist or belongs to someone else
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        if self.repository.mark_read(notification_id, user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Notification not found"))
        }
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self.repository.unread_count(user_id).await?)
    }

    /// Mark all of the user's notifications as read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self.repository.mark_all_read(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_repository::MemoryDocumentStore;

    #[tokio::test]
    async fn test_feed_lifecycle() {
        let feed = NotificationFeed::new(Arc::new(MemoryDocumentStore::new()));
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let first = feed
            .notify(NewNotification::new(user, "One", "first", "/store/1"))
            .await
            .unwrap();
        feed.notify(NewNotification::new(user, "Two", "second", "/store/1"))
            .await
            .unwrap();

        assert_eq!(feed.unread_count(user).await.unwrap(), 2);
        assert!(!first.is_read);

        let err = feed.mark_read(first.id, other).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        feed.mark_read(first.id, user).await.unwrap();
        assert_eq!(feed.unread_count(user).await.unwrap(), 1);

        assert_eq!(feed.mark_all_read(user).await.unwrap(), 1);
        assert_eq!(feed.unread_count(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_capped() {
        let feed = NotificationFeed::new(Arc::new(MemoryDocumentStore::new()));
        let user = Uuid::new_v4();

        for i in 0..(FEED_PAGE_SIZE + 5) {
            feed.notify(NewNotification::new(user, "Title", format!("#{}", i), "/"))
                .await
                .unwrap();
        }

        let listed = feed.list(user).await.unwrap();
        assert_eq!(listed.len(), FEED_PAGE_SIZE);
        assert_eq!(listed[0].message, format!("#{}", FEED_PAGE_SIZE + 4));
    }
}
