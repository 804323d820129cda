//! Database operations for the admin `PostgreSQL` instance.
//!
//! # Tables
//!
//! - `categories`, `products` - catalog (products nested under categories)
//! - `clients`, `client_favorites`, `client_coupons`, `client_notifications`
//! - `orders`, `order_items`
//! - `driver_accounts`, `drivers`, `deliveries`
//! - `promotions`
//! - `notifications` - flat store-wide collection
//!
//! Repositories validate inputs before writing, recompute derived fields
//! (stock status, line totals) from the values they are about to persist, and
//! publish a change event to the [`crate::watch::ChangeHub`] after each
//! successful write. Queries use sqlx's runtime API so the crate builds
//! without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p terra-verde-cli -- migrate
//! ```

pub mod catalog;
pub mod clients;
pub mod drivers;
pub mod notifications;
pub mod orders;
pub mod promotions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use clients::ClientRepository;
pub use drivers::DriverRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use promotions::PromotionRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Input rejected at the data-access boundary.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Whether a sqlx error is a `PostgreSQL` unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
