//! Catalog route handlers: categories and products.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;

use terra_verde_core::{CategoryId, ProductId, StockStatus, derive_listing_status};

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::models::{Category, NewCategory, NewProduct, Product, ProductUpdate, StockAdjustment};
use crate::state::AppState;
use crate::watch::Collection;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}/products", get(list_category_products))
        .route("/products", get(list_products).post(create_product))
        .route("/products/watch", get(watch_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/stock", put(set_stock))
}

/// A product as shown in listings, with the listing's own two-way stock
/// status beside the stored one.
#[derive(Debug, Serialize)]
pub struct ProductListEntry {
    #[serde(flatten)]
    pub product: Product,
    /// Two-way status (low-stock / in-stock, no zero case) computed for the
    /// listing summary. Can disagree with `status` for an empty shelf.
    pub listing_status: StockStatus,
}

impl From<Product> for ProductListEntry {
    fn from(product: Product) -> Self {
        let listing_status = derive_listing_status(product.stock, product.min_stock);
        Self {
            product,
            listing_status,
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// List all categories.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = CatalogRepository::new(state.pool(), state.hub())
        .list_categories()
        .await?;
    Ok(Json(categories))
}

/// Create a category.
///
/// # Errors
///
/// Returns an error if the input is invalid or the insert fails.
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CatalogRepository::new(state.pool(), state.hub())
        .create_category(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List the products of one category.
///
/// # Errors
///
/// Returns an error if the category does not exist or the query fails.
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Product>>, AppError> {
    let repo = CatalogRepository::new(state.pool(), state.hub());
    let category_id = CategoryId::new(id);

    repo.get_category(category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    let products = repo.list_products_in_category(category_id).await?;
    Ok(Json(products))
}

// =============================================================================
// Products
// =============================================================================

/// List all products with their listing summary status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductListEntry>>, AppError> {
    let products = CatalogRepository::new(state.pool(), state.hub())
        .list_products()
        .await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Create a product.
///
/// # Errors
///
/// Returns an error if the input is invalid or the insert fails.
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = CatalogRepository::new(state.pool(), state.hub())
        .create_product(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the query fails.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    let product = CatalogRepository::new(state.pool(), state.hub())
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// Update product details.
///
/// # Errors
///
/// Returns an error if the input is invalid, the product does not exist, or
/// the update fails.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    let product = CatalogRepository::new(state.pool(), state.hub())
        .update_product(ProductId::new(id), &update)
        .await?;
    Ok(Json(product))
}

/// Edit a product's stock level.
///
/// # Errors
///
/// Returns an error if the quantity is invalid, the product does not exist,
/// or the update fails.
pub async fn set_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<Json<Product>, AppError> {
    let product = CatalogRepository::new(state.pool(), state.hub())
        .set_stock(ProductId::new(id), adjustment)
        .await?;
    Ok(Json(product))
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the delete fails.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    CatalogRepository::new(state.pool(), state.hub())
        .delete_product(ProductId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Watch the products collection: current snapshot, then every change.
///
/// # Errors
///
/// Returns an error if the snapshot query fails.
pub async fn watch_products(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot = CatalogRepository::new(state.pool(), state.hub())
        .list_products()
        .await?;
    let subscription = state.hub().subscribe(Collection::Products);
    Ok(super::watch_sse(snapshot, subscription))
}
