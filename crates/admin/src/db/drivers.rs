//! Database operations for delivery drivers and their deliveries.
//!
//! The driver row references a login account provisioned by the identity
//! service beforehand; the two inserts are independent statements and a
//! failure here can leave an orphaned account (logged, not rolled back).
//!
//! Delivery writes publish the driver's refreshed counters so watchers see
//! the history / in-progress sizes move live.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use terra_verde_core::{DeliveryId, DriverAccountId, DriverId, Email, OrderId, VehicleType};

use super::RepositoryError;
use crate::models::driver::Delivery;
use crate::models::{DocumentKind, Driver, DriverStats, NewDelivery, NewDriver};
use crate::watch::{ChangeHub, ChangeKind, Collection};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for driver queries.
#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    vehicle_type: VehicleType,
    license_url: Option<String>,
    id_card_url: Option<String>,
    account_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = RepositoryError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("driver {} email: {e}", row.id))
        })?;
        Ok(Self {
            id: DriverId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            vehicle_type: row.vehicle_type,
            license_url: row.license_url,
            id_card_url: row.id_card_url,
            account_id: row.account_id.map(DriverAccountId::new),
            created_at: row.created_at,
        })
    }
}

/// Internal row type for delivery queries.
#[derive(Debug, sqlx::FromRow)]
struct DeliveryRow {
    id: i32,
    driver_id: i32,
    order_id: i32,
    started_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Self {
            id: DeliveryId::new(row.id),
            driver_id: DriverId::new(row.driver_id),
            order_id: OrderId::new(row.order_id),
            started_at: row.started_at,
            delivered_at: row.delivered_at,
        }
    }
}

/// Payload published to watchers when a driver's counters change.
#[derive(Debug, serde::Serialize)]
struct DriverStatsEvent {
    driver_id: DriverId,
    stats: DriverStats,
}

const DRIVER_COLUMNS: &str = "id, name, email, phone, vehicle_type, license_url, id_card_url, \
     account_id, created_at";
const DELIVERY_COLUMNS: &str = "id, driver_id, order_id, started_at, delivered_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for driver database operations.
pub struct DriverRepository<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> DriverRepository<'a> {
    /// Create a new driver repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Insert a driver row referencing an already-provisioned login account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for rejected input or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &NewDriver,
        account_id: DriverAccountId,
    ) -> Result<Driver, RepositoryError> {
        if input.name.trim().is_empty() {
            return Err(RepositoryError::Invalid("name cannot be empty".to_string()));
        }
        let email = Email::parse(&input.email)
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;

        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "INSERT INTO drivers (name, email, phone, vehicle_type, account_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(email.as_str())
        .bind(&input.phone)
        .bind(input.vehicle_type)
        .bind(account_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        let driver: Driver = row.try_into()?;
        self.hub.publish_record(
            Collection::Drivers,
            ChangeKind::Created,
            driver.id.as_i32(),
            &driver,
        );
        Ok(driver)
    }

    /// Get a driver by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or
    /// `RepositoryError::DataCorruption` if the stored email does not parse.
    pub async fn get(&self, id: DriverId) -> Result<Option<Driver>, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all drivers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or
    /// `RepositoryError::DataCorruption` if a stored email does not parse.
    pub async fn list(&self) -> Result<Vec<Driver>, RepositoryError> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Store the public URL of an uploaded driver document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the driver does not exist or
    /// `RepositoryError::Database` if the update fails.
    pub async fn set_document_url(
        &self,
        id: DriverId,
        kind: DocumentKind,
        url: &str,
    ) -> Result<Driver, RepositoryError> {
        let column = match kind {
            DocumentKind::License => "license_url",
            DocumentKind::IdCard => "id_card_url",
        };

        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "UPDATE drivers SET {column} = $2 WHERE id = $1 RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let driver: Driver = row.try_into()?;
        self.hub.publish_record(
            Collection::Drivers,
            ChangeKind::Updated,
            driver.id.as_i32(),
            &driver,
        );
        Ok(driver)
    }

    /// Live delivery counters for one driver: the sizes of the in-progress
    /// and history sub-collections.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, id: DriverId) -> Result<DriverStats, RepositoryError> {
        let (in_progress, completed): (i64, i64) = sqlx::query_as(
            "SELECT \
             COUNT(*) FILTER (WHERE delivered_at IS NULL), \
             COUNT(*) FILTER (WHERE delivered_at IS NOT NULL) \
             FROM deliveries WHERE driver_id = $1",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(DriverStats {
            in_progress,
            completed,
        })
    }

    /// Assign a delivery to a driver. Publishes the refreshed counters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn start_delivery(
        &self,
        driver_id: DriverId,
        input: NewDelivery,
    ) -> Result<Delivery, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "INSERT INTO deliveries (driver_id, order_id) VALUES ($1, $2) \
             RETURNING {DELIVERY_COLUMNS}"
        ))
        .bind(driver_id.as_i32())
        .bind(input.order_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        let delivery: Delivery = row.into();
        self.publish_stats(driver_id).await;
        Ok(delivery)
    }

    /// Mark a delivery as completed, moving it from in-progress to history.
    /// Publishes the refreshed counters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such in-progress delivery
    /// exists or `RepositoryError::Database` if the update fails.
    pub async fn complete_delivery(
        &self,
        driver_id: DriverId,
        delivery_id: DeliveryId,
    ) -> Result<Delivery, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "UPDATE deliveries SET delivered_at = now() \
             WHERE id = $1 AND driver_id = $2 AND delivered_at IS NULL \
             RETURNING {DELIVERY_COLUMNS}"
        ))
        .bind(delivery_id.as_i32())
        .bind(driver_id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let delivery: Delivery = row.into();
        self.publish_stats(driver_id).await;
        Ok(delivery)
    }

    /// List a driver's in-progress deliveries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_in_progress(
        &self,
        driver_id: DriverId,
    ) -> Result<Vec<Delivery>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries \
             WHERE driver_id = $1 AND delivered_at IS NULL ORDER BY started_at"
        ))
        .bind(driver_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List a driver's delivery history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_history(
        &self,
        driver_id: DriverId,
    ) -> Result<Vec<Delivery>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries \
             WHERE driver_id = $1 AND delivered_at IS NOT NULL ORDER BY delivered_at DESC"
        ))
        .bind(driver_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Publish refreshed counters for a driver; a failed count is only
    /// logged, the delivery write has already succeeded.
    async fn publish_stats(&self, driver_id: DriverId) {
        match self.stats(driver_id).await {
            Ok(stats) => {
                self.hub.publish_record(
                    Collection::Drivers,
                    ChangeKind::Updated,
                    driver_id.as_i32(),
                    &DriverStatsEvent { driver_id, stats },
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, %driver_id, "failed to refresh driver stats");
            }
        }
    }
}
