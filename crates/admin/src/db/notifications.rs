//! Database operations for the flat store-wide notifications collection.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use terra_verde_core::NotificationId;

use super::RepositoryError;
use crate::models::{NewNotification, Notification};
use crate::watch::{ChangeHub, ChangeKind, Collection};

/// Internal row type for notification queries.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i32,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            title: row.title,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Repository for store-wide notification operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Create a store-wide notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for an empty title or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewNotification) -> Result<Notification, RepositoryError> {
        if input.title.trim().is_empty() {
            return Err(RepositoryError::Invalid(
                "title cannot be empty".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, NotificationRow>(
            "INSERT INTO notifications (title, body) VALUES ($1, $2) \
             RETURNING id, title, body, created_at",
        )
        .bind(input.title.trim())
        .bind(&input.body)
        .fetch_one(self.pool)
        .await?;

        let notification: Notification = row.into();
        self.hub.publish_record(
            Collection::Notifications,
            ChangeKind::Created,
            notification.id.as_i32(),
            &notification,
        );
        Ok(notification)
    }

    /// List all notifications, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, title, body, created_at FROM notifications ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
