//! Order domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use terra_verde_core::{ClientId, OrderId, OrderItemId, OrderStatus, ProductId};

/// An order header. Line items are loaded separately (see
/// [`OrderWithItems`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Ordering client.
    pub client_id: ClientId,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Sum of all line totals, computed at write time.
    pub total: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One line of an order.
///
/// Name and image are captured from the catalog at order time; the first-seen
/// values stick even if the product is later renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique line item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Ordered product.
    pub product_id: ProductId,
    /// Product name at order time.
    pub product_name: String,
    /// Product image at order time, if any.
    pub product_image: Option<String>,
    /// Ordered quantity.
    pub quantity: i32,
    /// Unit price at order time.
    pub unit_price: Decimal,
    /// quantity * unit_price, computed at write time.
    pub line_total: Decimal,
}

/// An order with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    /// The order header.
    #[serde(flatten)]
    pub order: Order,
    /// All line items.
    pub items: Vec<OrderItem>,
}

/// Input for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    /// Ordering client.
    pub client_id: ClientId,
    /// Requested lines; prices are resolved from the catalog at write time.
    pub items: Vec<NewOrderItem>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewOrderItem {
    /// Product to order.
    pub product_id: ProductId,
    /// Quantity to order.
    pub quantity: i32,
}
