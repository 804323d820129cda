//! Catalog domain models: categories and the products nested under them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use terra_verde_core::{CategoryId, ProductId, StockStatus};

/// A product category. Products are nested under exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name (unique).
    pub name: String,
    /// Live product counter, maintained as a separate statement next to each
    /// product insert/delete.
    pub product_count: i32,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    /// Sales unit, e.g. "kg" or "bundle".
    pub unit: String,
    /// Current stock quantity.
    pub stock: i32,
    /// Low-stock threshold: floor(0.1 * max_stock), fixed at write time.
    pub min_stock: i32,
    /// Original maximum stock.
    pub max_stock: i32,
    /// Public image URLs.
    pub images: Vec<String>,
    /// Whether the product is visible in the storefront.
    pub published: bool,
    /// Stock status as persisted by the last writer.
    pub status: StockStatus,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Owning category.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    /// Sales unit.
    pub unit: String,
    /// Initial stock quantity.
    pub stock: i32,
    /// Maximum stock; the low-stock threshold is derived from it.
    pub max_stock: i32,
    /// Public image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Whether the product is published immediately.
    #[serde(default)]
    pub published: bool,
}

/// Input for updating product details. Stock changes go through
/// [`StockAdjustment`] instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New unit price.
    pub price: Option<Decimal>,
    /// New sales unit.
    pub unit: Option<String>,
    /// Replacement image URL list.
    pub images: Option<Vec<String>>,
    /// New published flag.
    pub published: Option<bool>,
}

/// Input for editing a product's stock level.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockAdjustment {
    /// New stock quantity.
    pub stock: i32,
}
