//! Store-wide notifications and the static dashboard feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use terra_verde_core::NotificationId;

/// A persisted store-wide notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification ID.
    pub id: NotificationId,
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a store-wide notification.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
}

/// One entry of the dashboard's notification feed.
///
/// The feed is a static, locally seeded list: it has no persistence layer and
/// resets on every process start.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    /// Short title.
    pub title: &'static str,
    /// Message body.
    pub body: &'static str,
    /// Icon hint for the frontend.
    pub icon: &'static str,
}

/// The locally seeded dashboard feed.
#[must_use]
pub fn seeded_feed() -> Vec<FeedItem> {
    vec![
        FeedItem {
            title: "Welcome back",
            body: "The harvest dashboard is up to date.",
            icon: "sun",
        },
        FeedItem {
            title: "Stock check",
            body: "Review products flagged low-stock before the weekend rush.",
            icon: "package",
        },
        FeedItem {
            title: "Driver documents",
            body: "Two drivers still have documents pending upload.",
            icon: "truck",
        },
    ]
}
