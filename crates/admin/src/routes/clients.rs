//! Client route handlers, including the orders/favorites/coupons/
//! notifications sub-collections.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use terra_verde_core::{ClientId, CouponId, NotificationId, ProductId};

use crate::db::{ClientRepository, OrderRepository};
use crate::error::AppError;
use crate::models::{
    Client, ClientCoupon, ClientNotification, Favorite, NewClient, NewClientNotification,
    NewCoupon, Order,
};
use crate::state::AppState;
use crate::watch::Collection;

/// Build the clients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/watch", get(watch_clients))
        .route("/clients/{id}", get(get_client))
        .route("/clients/{id}/orders", get(list_client_orders))
        .route("/clients/{id}/favorites", get(list_favorites))
        .route(
            "/clients/{id}/favorites/{product_id}",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/clients/{id}/coupons",
            get(list_coupons).post(issue_coupon),
        )
        .route("/clients/{id}/coupons/{coupon_id}/use", post(use_coupon))
        .route(
            "/clients/{id}/notifications",
            get(list_notifications).post(send_notification),
        )
        .route(
            "/clients/{id}/notifications/{notification_id}/read",
            post(mark_notification_read),
        )
}

/// List all clients.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    let clients = ClientRepository::new(state.pool(), state.hub()).list().await?;
    Ok(Json(clients))
}

/// Create a client.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken, or the
/// insert fails.
pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<NewClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let client = ClientRepository::new(state.pool(), state.hub())
        .create(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// Get a client.
///
/// # Errors
///
/// Returns an error if the client does not exist or the query fails.
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Client>, AppError> {
    let client = ClientRepository::new(state.pool(), state.hub())
        .get(ClientId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("client {id}")))?;
    Ok(Json(client))
}

/// List a client's orders.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_client_orders(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool(), state.hub())
        .list_for_client(ClientId::new(id))
        .await?;
    Ok(Json(orders))
}

/// List a client's favorites.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Favorite>>, AppError> {
    let favorites = ClientRepository::new(state.pool(), state.hub())
        .list_favorites(ClientId::new(id))
        .await?;
    Ok(Json(favorites))
}

/// Add a product to a client's favorites.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn add_favorite(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    ClientRepository::new(state.pool(), state.hub())
        .add_favorite(ClientId::new(id), ProductId::new(product_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a product from a client's favorites.
///
/// # Errors
///
/// Returns an error if it was not a favorite or the delete fails.
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    ClientRepository::new(state.pool(), state.hub())
        .remove_favorite(ClientId::new(id), ProductId::new(product_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a client's coupons.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_coupons(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ClientCoupon>>, AppError> {
    let coupons = ClientRepository::new(state.pool(), state.hub())
        .list_coupons(ClientId::new(id))
        .await?;
    Ok(Json(coupons))
}

/// Issue a coupon to a client.
///
/// # Errors
///
/// Returns an error if the input is invalid or the insert fails.
pub async fn issue_coupon(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<NewCoupon>,
) -> Result<(StatusCode, Json<ClientCoupon>), AppError> {
    let coupon = ClientRepository::new(state.pool(), state.hub())
        .issue_coupon(ClientId::new(id), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Mark a coupon as used.
///
/// # Errors
///
/// Returns an error if the coupon does not exist or the update fails.
pub async fn use_coupon(
    State(state): State<AppState>,
    Path((_, coupon_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    ClientRepository::new(state.pool(), state.hub())
        .mark_coupon_used(CouponId::new(coupon_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a client's notifications.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ClientNotification>>, AppError> {
    let notifications = ClientRepository::new(state.pool(), state.hub())
        .list_notifications(ClientId::new(id))
        .await?;
    Ok(Json(notifications))
}

/// Send a notification to a client.
///
/// # Errors
///
/// Returns an error if the input is invalid or the insert fails.
pub async fn send_notification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<NewClientNotification>,
) -> Result<(StatusCode, Json<ClientNotification>), AppError> {
    let notification = ClientRepository::new(state.pool(), state.hub())
        .notify(ClientId::new(id), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// Mark a client notification as read.
///
/// # Errors
///
/// Returns an error if the notification does not exist or the update fails.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path((_, notification_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    ClientRepository::new(state.pool(), state.hub())
        .mark_notification_read(NotificationId::new(notification_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Watch the clients collection: current snapshot, then every change.
///
/// # Errors
///
/// Returns an error if the snapshot query fails.
pub async fn watch_clients(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot = ClientRepository::new(state.pool(), state.hub()).list().await?;
    let subscription = state.hub().subscribe(Collection::Clients);
    Ok(super::watch_sse(snapshot, subscription))
}
