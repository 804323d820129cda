//! Client domain models and their sub-collection records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use terra_verde_core::{ClientId, CouponId, DiscountKind, Email, NotificationId, ProductId};

/// A store client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client ID.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Contact email (unique).
    pub email: Email,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional delivery address.
    pub address: Option<String>,
    /// When the client was created.
    pub created_at: DateTime<Utc>,
}

/// A product a client marked as favorite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    /// Owning client.
    pub client_id: ClientId,
    /// Favorited product.
    pub product_id: ProductId,
    /// When it was added.
    pub added_at: DateTime<Utc>,
}

/// A discount coupon issued to one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCoupon {
    /// Unique coupon ID.
    pub id: CouponId,
    /// Owning client.
    pub client_id: ClientId,
    /// Coupon code shown to the client.
    pub code: String,
    /// Discount kind.
    pub kind: DiscountKind,
    /// Discount value (percentage 0-100 or fixed amount).
    pub value: Decimal,
    /// Whether the coupon has been redeemed.
    pub used: bool,
    /// Optional expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the coupon was issued.
    pub created_at: DateTime<Utc>,
}

/// A notification delivered to one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientNotification {
    /// Unique notification ID.
    pub id: NotificationId,
    /// Owning client.
    pub client_id: ClientId,
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Whether the client has read it.
    pub read: bool,
    /// When it was sent.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    /// Display name.
    pub name: String,
    /// Contact email; parsed and validated before insert.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional delivery address.
    pub address: Option<String>,
}

/// Input for issuing a coupon to a client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCoupon {
    /// Coupon code.
    pub code: String,
    /// Discount kind.
    pub kind: DiscountKind,
    /// Discount value.
    pub value: Decimal,
    /// Optional expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for sending a notification to a client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClientNotification {
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
}
