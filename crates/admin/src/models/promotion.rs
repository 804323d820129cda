//! Promotion domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use terra_verde_core::{DiscountKind, ProductId, PromotionId, PromotionStatus};

/// A promotion, scoped to one product or to the whole catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    /// Unique promotion ID.
    pub id: PromotionId,
    /// Scoped product; `None` applies to the whole catalog.
    pub product_id: Option<ProductId>,
    /// Discount kind.
    pub kind: DiscountKind,
    /// Discount value (percentage 0-100 or fixed amount).
    pub value: Decimal,
    /// Start of the validity window.
    pub starts_at: DateTime<Utc>,
    /// End of the validity window.
    pub ends_at: DateTime<Utc>,
    /// Number of redemptions so far.
    pub usage_count: i32,
    /// Optional redemption cap.
    pub usage_cap: Option<i32>,
    /// When the promotion was created.
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Derive the lifecycle status by comparing the validity window against
    /// `now`. Never persisted.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> PromotionStatus {
        if now < self.starts_at {
            PromotionStatus::Scheduled
        } else if now > self.ends_at {
            PromotionStatus::Expired
        } else {
            PromotionStatus::Active
        }
    }

    /// Whether the usage cap (if any) has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_cap.is_some_and(|cap| self.usage_count >= cap)
    }
}

/// Input for creating a promotion.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    /// Scoped product; omit for a catalog-wide promotion.
    pub product_id: Option<ProductId>,
    /// Discount kind.
    pub kind: DiscountKind,
    /// Discount value.
    pub value: Decimal,
    /// Start of the validity window.
    pub starts_at: DateTime<Utc>,
    /// End of the validity window.
    pub ends_at: DateTime<Utc>,
    /// Optional redemption cap.
    pub usage_cap: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn promo(starts: DateTime<Utc>, ends: DateTime<Utc>) -> Promotion {
        Promotion {
            id: PromotionId::new(1),
            product_id: None,
            kind: DiscountKind::Percentage,
            value: Decimal::new(10, 0),
            starts_at: starts,
            ends_at: ends,
            usage_count: 0,
            usage_cap: None,
            created_at: starts,
        }
    }

    #[test]
    fn test_status_follows_window() {
        let starts = Utc.with_ymd_and_hms(2023, 7, 10, 0, 0, 0).single().expect("valid");
        let ends = Utc.with_ymd_and_hms(2023, 7, 20, 0, 0, 0).single().expect("valid");
        let promo = promo(starts, ends);

        let before = Utc.with_ymd_and_hms(2023, 7, 9, 12, 0, 0).single().expect("valid");
        let during = Utc.with_ymd_and_hms(2023, 7, 15, 12, 0, 0).single().expect("valid");
        let after = Utc.with_ymd_and_hms(2023, 7, 21, 0, 0, 0).single().expect("valid");

        assert_eq!(promo.status(before), PromotionStatus::Scheduled);
        assert_eq!(promo.status(during), PromotionStatus::Active);
        assert_eq!(promo.status(after), PromotionStatus::Expired);
    }

    #[test]
    fn test_status_at_window_edges() {
        let starts = Utc.with_ymd_and_hms(2023, 7, 10, 0, 0, 0).single().expect("valid");
        let ends = Utc.with_ymd_and_hms(2023, 7, 20, 0, 0, 0).single().expect("valid");
        let promo = promo(starts, ends);

        // The window is inclusive at both ends.
        assert_eq!(promo.status(starts), PromotionStatus::Active);
        assert_eq!(promo.status(ends), PromotionStatus::Active);
    }

    #[test]
    fn test_exhaustion_against_cap() {
        let starts = Utc.with_ymd_and_hms(2023, 7, 10, 0, 0, 0).single().expect("valid");
        let ends = Utc.with_ymd_and_hms(2023, 7, 20, 0, 0, 0).single().expect("valid");
        let mut promo = promo(starts, ends);

        assert!(!promo.is_exhausted(), "no cap means never exhausted");

        promo.usage_cap = Some(3);
        promo.usage_count = 2;
        assert!(!promo.is_exhausted());

        promo.usage_count = 3;
        assert!(promo.is_exhausted());
    }
}
