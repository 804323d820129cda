//! Database operations for orders and their line items.
//!
//! Line totals and the order total are computed at write time from the
//! catalog prices in effect when the order is placed. An order and its items
//! correspond to a single record of the upstream data model, so they are
//! inserted in one transaction; no other repository writes span statements
//! transactionally.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use terra_verde_core::{ClientId, OrderId, OrderItemId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, OrderWithItems};
use crate::watch::{ChangeHub, ChangeKind, Collection};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    client_id: i32,
    status: OrderStatus,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            client_id: ClientId::new(row.client_id),
            status: row.status,
            total: row.total,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    product_image: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            product_image: row.product_image,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.line_total,
        }
    }
}

const ORDER_COLUMNS: &str = "id, client_id, status, total, created_at";
const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, product_image, quantity, unit_price, line_total";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Place an order. Unit prices, names, and images are resolved from the
    /// catalog at write time; line totals and the order total are computed
    /// here from those values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for an empty order or non-positive
    /// quantity, `RepositoryError::NotFound` if a referenced product does not
    /// exist, or `RepositoryError::Database` if a query fails.
    pub async fn create(&self, input: &NewOrder) -> Result<OrderWithItems, RepositoryError> {
        if input.items.is_empty() {
            return Err(RepositoryError::Invalid(
                "order must contain at least one item".to_string(),
            ));
        }
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(RepositoryError::Invalid(
                    "item quantity must be positive".to_string(),
                ));
            }
        }

        // Resolve catalog data before opening the transaction.
        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let product: Option<(String, Option<String>, Decimal)> = sqlx::query_as(
                "SELECT name, images[1], price FROM products WHERE id = $1",
            )
            .bind(item.product_id.as_i32())
            .fetch_optional(self.pool)
            .await?;

            let (name, image, price) = product.ok_or(RepositoryError::NotFound)?;
            let line_total = price * Decimal::from(item.quantity);
            lines.push((item.product_id, name, image, item.quantity, price, line_total));
        }

        let total: Decimal = lines.iter().map(|line| line.5).sum();

        let mut tx = self.pool.begin().await?;

        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (client_id, status, total) \
             VALUES ($1, 'pending', $2) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(input.client_id.as_i32())
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product_id, name, image, quantity, unit_price, line_total) in lines {
            let item_row = sqlx::query_as::<_, OrderItemRow>(&format!(
                "INSERT INTO order_items \
                 (order_id, product_id, product_name, product_image, quantity, \
                  unit_price, line_total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order_row.id)
            .bind(product_id.as_i32())
            .bind(name)
            .bind(image)
            .bind(quantity)
            .bind(unit_price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        let order = OrderWithItems {
            order: order_row.into(),
            items,
        };
        self.hub.publish_record(
            Collection::Orders,
            ChangeKind::Created,
            order.order.id.as_i32(),
            &order,
        );
        Ok(order)
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(id).await?;
        Ok(Some(OrderWithItems {
            order: row.into(),
            items,
        }))
    }

    /// List all order headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List one client's order headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(client_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List every order line item across all orders, for the top-products
    /// aggregation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_items(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist or
    /// `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let order: Order = row.into();
        self.hub.publish_record(
            Collection::Orders,
            ChangeKind::Updated,
            order.id.as_i32(),
            &order,
        );
        Ok(order)
    }

    async fn items_for(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
