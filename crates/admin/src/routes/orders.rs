//! Order route handlers, including the history grouping and top-products
//! aggregations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use terra_verde_core::{OrderId, OrderStatus};

use crate::analytics::{Granularity, OrderGroup, TopProduct, group_orders, top_products};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::models::{NewOrder, Order, OrderWithItems};
use crate::state::AppState;
use crate::watch::Collection;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/watch", get(watch_orders))
        .route("/orders/history", get(order_history))
        .route("/orders/top-products", get(list_top_products))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(set_status))
}

/// Query parameters for the grouped order history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Grouping granularity: day (default), month, or year.
    pub granularity: Option<String>,
    /// Substring filter on group labels.
    pub filter: Option<String>,
}

/// Body for updating an order's status.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    /// New status.
    pub status: OrderStatus,
}

/// List all order headers.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool(), state.hub()).list().await?;
    Ok(Json(orders))
}

/// Place an order.
///
/// # Errors
///
/// Returns an error if the input is invalid, a product is unknown, or a
/// query fails.
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<NewOrder>,
) -> Result<(StatusCode, Json<OrderWithItems>), AppError> {
    let order = OrderRepository::new(state.pool(), state.hub())
        .create(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order with its items.
///
/// # Errors
///
/// Returns an error if the order does not exist or a query fails.
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderWithItems>, AppError> {
    let order = OrderRepository::new(state.pool(), state.hub())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

/// Update an order's status.
///
/// # Errors
///
/// Returns an error if the order does not exist or the update fails.
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool(), state.hub())
        .set_status(OrderId::new(id), update.status)
        .await?;
    Ok(Json(order))
}

/// Grouped order history: orders bucketed by day, month, or year, with
/// per-group totals and status counts, labels sorted descending.
///
/// # Errors
///
/// Returns an error for an unknown granularity or if the query fails.
pub async fn order_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<OrderGroup>>, AppError> {
    let granularity = match params.granularity.as_deref() {
        None => Granularity::Day,
        Some(value) => value.parse().map_err(AppError::BadRequest)?,
    };

    let orders = OrderRepository::new(state.pool(), state.hub()).list().await?;
    let groups = group_orders(orders, granularity, params.filter.as_deref());
    Ok(Json(groups))
}

/// The ten best-selling products by total quantity.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_top_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopProduct>>, AppError> {
    let items = OrderRepository::new(state.pool(), state.hub())
        .list_all_items()
        .await?;
    Ok(Json(top_products(&items)))
}

/// Watch the orders collection: current snapshot, then every change.
///
/// # Errors
///
/// Returns an error if the snapshot query fails.
pub async fn watch_orders(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot = OrderRepository::new(state.pool(), state.hub()).list().await?;
    let subscription = state.hub().subscribe(Collection::Orders);
    Ok(super::watch_sse(snapshot, subscription))
}
