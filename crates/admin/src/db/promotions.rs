//! Database operations for promotions.
//!
//! Lifecycle status is derived from the validity window at read time; only
//! the window, the counters, and the discount itself are stored. Redemption
//! is a single conditional update so the cap cannot be overshot by
//! concurrent redeemers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use terra_verde_core::{DiscountKind, ProductId, PromotionId, PromotionStatus};

use super::RepositoryError;
use crate::models::{NewPromotion, Promotion};
use crate::watch::{ChangeHub, ChangeKind, Collection};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for promotion queries.
#[derive(Debug, sqlx::FromRow)]
struct PromotionRow {
    id: i32,
    product_id: Option<i32>,
    kind: DiscountKind,
    value: Decimal,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    usage_count: i32,
    usage_cap: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Self {
            id: PromotionId::new(row.id),
            product_id: row.product_id.map(ProductId::new),
            kind: row.kind,
            value: row.value,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            usage_count: row.usage_count,
            usage_cap: row.usage_cap,
            created_at: row.created_at,
        }
    }
}

const PROMOTION_COLUMNS: &str = "id, product_id, kind, value, starts_at, ends_at, usage_count, \
     usage_cap, created_at";

// =============================================================================
// Validation
// =============================================================================

fn validate_new_promotion(input: &NewPromotion) -> Result<(), RepositoryError> {
    if input.value <= Decimal::ZERO {
        return Err(RepositoryError::Invalid(
            "value must be positive".to_string(),
        ));
    }
    if input.kind == DiscountKind::Percentage && input.value > Decimal::from(100) {
        return Err(RepositoryError::Invalid(
            "percentage cannot exceed 100".to_string(),
        ));
    }
    if input.starts_at >= input.ends_at {
        return Err(RepositoryError::Invalid(
            "validity window must start before it ends".to_string(),
        ));
    }
    if let Some(cap) = input.usage_cap {
        if cap <= 0 {
            return Err(RepositoryError::Invalid(
                "usage cap must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for promotion database operations.
pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> PromotionRepository<'a> {
    /// Create a new promotion repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for rejected input or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewPromotion) -> Result<Promotion, RepositoryError> {
        validate_new_promotion(input)?;

        let row = sqlx::query_as::<_, PromotionRow>(&format!(
            "INSERT INTO promotions (product_id, kind, value, starts_at, ends_at, usage_cap) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROMOTION_COLUMNS}"
        ))
        .bind(input.product_id.map(|id| id.as_i32()))
        .bind(input.kind)
        .bind(input.value)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.usage_cap)
        .fetch_one(self.pool)
        .await?;

        let promotion: Promotion = row.into();
        self.hub.publish_record(
            Collection::Promotions,
            ChangeKind::Created,
            promotion.id.as_i32(),
            &promotion,
        );
        Ok(promotion)
    }

    /// Get a promotion by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        let row = sqlx::query_as::<_, PromotionRow>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all promotions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Promotion>, RepositoryError> {
        let rows = sqlx::query_as::<_, PromotionRow>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Redeem one use of a promotion.
    ///
    /// Refused outside the validity window and at the usage cap. The counter
    /// increment is conditional on the cap in a single statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist,
    /// `RepositoryError::Invalid` if it is not active,
    /// `RepositoryError::Conflict` at the cap, or
    /// `RepositoryError::Database` if a query fails.
    pub async fn redeem(&self, id: PromotionId) -> Result<Promotion, RepositoryError> {
        let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        if current.status(now) != PromotionStatus::Active {
            return Err(RepositoryError::Invalid(
                "promotion is not active".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, PromotionRow>(&format!(
            "UPDATE promotions SET usage_count = usage_count + 1 \
             WHERE id = $1 AND (usage_cap IS NULL OR usage_count < usage_cap) \
             RETURNING {PROMOTION_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::Conflict("usage cap reached".to_string()))?;

        let promotion: Promotion = row.into();
        self.hub.publish_record(
            Collection::Promotions,
            ChangeKind::Updated,
            promotion.id.as_i32(),
            &promotion,
        );
        Ok(promotion)
    }

    /// Delete a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist or
    /// `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.hub.publish_deleted(Collection::Promotions, id.as_i32());
        Ok(())
    }
}
