//! Notification types for the per-user feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-user feed entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    /// Deep link into the client, e.g. `/store/{storeId}`.
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// The write contract of the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub link: String,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            link: link.into(),
        }
    }

    /// Materialize an unread notification created at `now`.
    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            link: self.link,
            is_read: false,
            created_at: now,
        }
    }
}
