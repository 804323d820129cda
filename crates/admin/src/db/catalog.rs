//! Database operations for the catalog: categories and products.
//!
//! Writers recompute the stock status from the values they are about to
//! persist (three-way rule). The category product counter is maintained as a
//! separate statement next to each product insert/delete, with no rollback if
//! it fails.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use terra_verde_core::{
    CategoryId, ProductId, StockStatus, derive_status, low_stock_threshold,
};

use super::{RepositoryError, is_unique_violation};
use crate::models::{Category, NewCategory, NewProduct, Product, ProductUpdate, StockAdjustment};
use crate::watch::{ChangeHub, ChangeKind, Collection};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    product_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            product_count: row.product_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    unit: String,
    stock: i32,
    min_stock: i32,
    max_stock: i32,
    images: Vec<String>,
    published: bool,
    status: StockStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            description: row.description,
            price: row.price,
            unit: row.unit,
            stock: row.stock,
            min_stock: row.min_stock,
            max_stock: row.max_stock,
            images: row.images,
            published: row.published,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, category_id, name, description, price, unit, stock, \
     min_stock, max_stock, images, published, status, created_at, updated_at";

// =============================================================================
// Validation
// =============================================================================

fn validate_new_product(input: &NewProduct) -> Result<(), RepositoryError> {
    if input.name.trim().is_empty() {
        return Err(RepositoryError::Invalid("name cannot be empty".to_string()));
    }
    if input.price <= Decimal::ZERO {
        return Err(RepositoryError::Invalid(
            "price must be positive".to_string(),
        ));
    }
    if input.unit.trim().is_empty() {
        return Err(RepositoryError::Invalid("unit cannot be empty".to_string()));
    }
    if input.stock < 0 {
        return Err(RepositoryError::Invalid(
            "stock cannot be negative".to_string(),
        ));
    }
    if input.max_stock <= 0 {
        return Err(RepositoryError::Invalid(
            "max stock must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_update(update: &ProductUpdate) -> Result<(), RepositoryError> {
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(RepositoryError::Invalid("name cannot be empty".to_string()));
        }
    }
    if let Some(price) = update.price {
        if price <= Decimal::ZERO {
            return Err(RepositoryError::Invalid(
                "price must be positive".to_string(),
            ));
        }
    }
    if let Some(unit) = &update.unit {
        if unit.trim().is_empty() {
            return Err(RepositoryError::Invalid("unit cannot be empty".to_string()));
        }
    }
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for an empty name,
    /// `RepositoryError::Conflict` for a duplicate name, or
    /// `RepositoryError::Database` if the query fails.
    pub async fn create_category(
        &self,
        input: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        if input.name.trim().is_empty() {
            return Err(RepositoryError::Invalid("name cannot be empty".to_string()));
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name) VALUES ($1) \
             RETURNING id, name, product_count, created_at, updated_at",
        )
        .bind(input.name.trim())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("category '{}' already exists", input.name))
            } else {
                RepositoryError::Database(e)
            }
        })?;

        let category: Category = row.into();
        self.hub.publish_record(
            Collection::Categories,
            ChangeKind::Created,
            category.id.as_i32(),
            &category,
        );
        Ok(category)
    }

    /// List all categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, product_count, created_at, updated_at \
             FROM categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, product_count, created_at, updated_at \
             FROM categories WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a new product under a category.
    ///
    /// The minimum stock and the status are derived here from the submitted
    /// values (three-way rule). The category counter is incremented as an
    /// independent follow-up statement; a failure there leaves the counter
    /// stale and is only logged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for rejected input or
    /// `RepositoryError::Database` if the insert fails.
    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        validate_new_product(input)?;

        let min_stock = low_stock_threshold(input.max_stock);
        let status = derive_status(input.stock, min_stock);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
             (category_id, name, description, price, unit, stock, min_stock, max_stock, \
              images, published, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(input.category_id.as_i32())
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.unit.trim())
        .bind(input.stock)
        .bind(min_stock)
        .bind(input.max_stock)
        .bind(&input.images)
        .bind(input.published)
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        let product: Product = row.into();

        if let Err(e) = sqlx::query(
            "UPDATE categories SET product_count = product_count + 1, updated_at = now() \
             WHERE id = $1",
        )
        .bind(product.category_id.as_i32())
        .execute(self.pool)
        .await
        {
            tracing::warn!(
                error = %e,
                category_id = %product.category_id,
                "product created but category counter update failed"
            );
        }

        self.hub.publish_record(
            Collection::Products,
            ChangeKind::Created,
            product.id.as_i32(),
            &product,
        );
        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List the products of one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE category_id = $1 ORDER BY created_at DESC"
        ))
        .bind(category_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update product details. Stock is edited via [`Self::set_stock`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for rejected input,
    /// `RepositoryError::NotFound` if the product does not exist, or
    /// `RepositoryError::Database` if the query fails.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        validate_update(update)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             price = COALESCE($4, price), \
             unit = COALESCE($5, unit), \
             images = COALESCE($6, images), \
             published = COALESCE($7, published), \
             updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(update.price)
        .bind(update.unit.as_deref().map(str::trim))
        .bind(&update.images)
        .bind(update.published)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let product: Product = row.into();
        self.hub.publish_record(
            Collection::Products,
            ChangeKind::Updated,
            product.id.as_i32(),
            &product,
        );
        Ok(product)
    }

    /// Set a product's stock level, recomputing the status from the new
    /// quantity and the stored minimum (three-way rule).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for a negative quantity,
    /// `RepositoryError::NotFound` if the product does not exist, or
    /// `RepositoryError::Database` if the query fails.
    pub async fn set_stock(
        &self,
        id: ProductId,
        adjustment: StockAdjustment,
    ) -> Result<Product, RepositoryError> {
        if adjustment.stock < 0 {
            return Err(RepositoryError::Invalid(
                "stock cannot be negative".to_string(),
            ));
        }

        let current = self.get_product(id).await?.ok_or(RepositoryError::NotFound)?;
        let status = derive_status(adjustment.stock, current.min_stock);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET stock = $2, status = $3, updated_at = now() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(adjustment.stock)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let product: Product = row.into();
        self.hub.publish_record(
            Collection::Products,
            ChangeKind::Updated,
            product.id.as_i32(),
            &product,
        );
        Ok(product)
    }

    /// Delete a product. The category counter is decremented as an
    /// independent follow-up statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// `RepositoryError::Database` if the query fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let row: Option<(i32,)> =
            sqlx::query_as("DELETE FROM products WHERE id = $1 RETURNING category_id")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        let (category_id,) = row.ok_or(RepositoryError::NotFound)?;

        if let Err(e) = sqlx::query(
            "UPDATE categories \
             SET product_count = GREATEST(product_count - 1, 0), updated_at = now() \
             WHERE id = $1",
        )
        .bind(category_id)
        .execute(self.pool)
        .await
        {
            tracing::warn!(
                error = %e,
                category_id,
                "product deleted but category counter update failed"
            );
        }

        self.hub.publish_deleted(Collection::Products, id.as_i32());
        Ok(())
    }
}
