//! Database operations for clients and their sub-collections
//! (favorites, coupons, notifications). A client's orders live in the
//! orders table and are queried through [`super::OrderRepository`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use terra_verde_core::{ClientId, CouponId, DiscountKind, Email, NotificationId, ProductId};

use super::{RepositoryError, is_unique_violation};
use crate::models::{
    Client, ClientCoupon, ClientNotification, Favorite, NewClient, NewClientNotification,
    NewCoupon,
};
use crate::watch::{ChangeHub, ChangeKind, Collection};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for client queries.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("client {} email: {e}", row.id))
        })?;
        Ok(Self {
            id: ClientId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            address: row.address,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for coupon queries.
#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: i32,
    client_id: i32,
    code: String,
    kind: DiscountKind,
    value: Decimal,
    used: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<CouponRow> for ClientCoupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: CouponId::new(row.id),
            client_id: ClientId::new(row.client_id),
            code: row.code,
            kind: row.kind,
            value: row.value,
            used: row.used,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for client notification queries.
#[derive(Debug, sqlx::FromRow)]
struct ClientNotificationRow {
    id: i32,
    client_id: i32,
    title: String,
    body: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<ClientNotificationRow> for ClientNotification {
    fn from(row: ClientNotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            client_id: ClientId::new(row.client_id),
            title: row.title,
            body: row.body,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for favorite queries.
#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    client_id: i32,
    product_id: i32,
    added_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            client_id: ClientId::new(row.client_id),
            product_id: ProductId::new(row.product_id),
            added_at: row.added_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for client database operations.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Create a new client. The email is parsed and validated here, at the
    /// data-access boundary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for rejected input,
    /// `RepositoryError::Conflict` for a duplicate email, or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewClient) -> Result<Client, RepositoryError> {
        if input.name.trim().is_empty() {
            return Err(RepositoryError::Invalid("name cannot be empty".to_string()));
        }
        let email = Email::parse(&input.email)
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;

        let row = sqlx::query_as::<_, ClientRow>(
            "INSERT INTO clients (name, email, phone, address) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, phone, address, created_at",
        )
        .bind(input.name.trim())
        .bind(email.as_str())
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("client email '{email}' already registered"))
            } else {
                RepositoryError::Database(e)
            }
        })?;

        let client: Client = row.try_into()?;
        self.hub.publish_record(
            Collection::Clients,
            ChangeKind::Created,
            client.id.as_i32(),
            &client,
        );
        Ok(client)
    }

    /// Get a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or
    /// `RepositoryError::DataCorruption` if the stored email does not parse.
    pub async fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, phone, address, created_at FROM clients WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all clients, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or
    /// `RepositoryError::DataCorruption` if a stored email does not parse.
    pub async fn list(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, phone, address, created_at \
             FROM clients ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Add a product to a client's favorites. Adding twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_favorite(
        &self,
        client_id: ClientId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO client_favorites (client_id, product_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(client_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a product from a client's favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it was not a favorite or
    /// `RepositoryError::Database` if the delete fails.
    pub async fn remove_favorite(
        &self,
        client_id: ClientId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM client_favorites WHERE client_id = $1 AND product_id = $2")
                .bind(client_id.as_i32())
                .bind(product_id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List a client's favorites, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_favorites(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT client_id, product_id, added_at FROM client_favorites \
             WHERE client_id = $1 ORDER BY added_at DESC",
        )
        .bind(client_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Issue a coupon to a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for rejected input or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn issue_coupon(
        &self,
        client_id: ClientId,
        input: &NewCoupon,
    ) -> Result<ClientCoupon, RepositoryError> {
        if input.code.trim().is_empty() {
            return Err(RepositoryError::Invalid("code cannot be empty".to_string()));
        }
        if input.value <= Decimal::ZERO {
            return Err(RepositoryError::Invalid(
                "value must be positive".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, CouponRow>(
            "INSERT INTO client_coupons (client_id, code, kind, value, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, client_id, code, kind, value, used, expires_at, created_at",
        )
        .bind(client_id.as_i32())
        .bind(input.code.trim())
        .bind(input.kind)
        .bind(input.value)
        .bind(input.expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List a client's coupons, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_coupons(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientCoupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(
            "SELECT id, client_id, code, kind, value, used, expires_at, created_at \
             FROM client_coupons WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark a coupon as used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist or
    /// `RepositoryError::Database` if the update fails.
    pub async fn mark_coupon_used(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE client_coupons SET used = TRUE WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Send a notification to a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for an empty title or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn notify(
        &self,
        client_id: ClientId,
        input: &NewClientNotification,
    ) -> Result<ClientNotification, RepositoryError> {
        if input.title.trim().is_empty() {
            return Err(RepositoryError::Invalid(
                "title cannot be empty".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, ClientNotificationRow>(
            "INSERT INTO client_notifications (client_id, title, body) \
             VALUES ($1, $2, $3) \
             RETURNING id, client_id, title, body, read, created_at",
        )
        .bind(client_id.as_i32())
        .bind(input.title.trim())
        .bind(&input.body)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List a client's notifications, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_notifications(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientNotification>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientNotificationRow>(
            "SELECT id, client_id, title, body, read, created_at \
             FROM client_notifications WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark a client notification as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist
    /// or `RepositoryError::Database` if the update fails.
    pub async fn mark_notification_read(
        &self,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE client_notifications SET read = TRUE WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
