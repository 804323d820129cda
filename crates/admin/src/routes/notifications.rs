//! Store-wide notification route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::NotificationRepository;
use crate::error::AppError;
use crate::models::{NewNotification, Notification};
use crate::state::AppState;
use crate::watch::Collection;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(list_notifications).post(create_notification),
        )
        .route("/notifications/watch", get(watch_notifications))
}

/// List all store-wide notifications.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = NotificationRepository::new(state.pool(), state.hub())
        .list()
        .await?;
    Ok(Json(notifications))
}

/// Create a store-wide notification.
///
/// # Errors
///
/// Returns an error if the input is invalid or the insert fails.
pub async fn create_notification(
    State(state): State<AppState>,
    Json(input): Json<NewNotification>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let notification = NotificationRepository::new(state.pool(), state.hub())
        .create(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// Watch the notifications collection: current snapshot, then every change.
///
/// # Errors
///
/// Returns an error if the snapshot query fails.
pub async fn watch_notifications(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot = NotificationRepository::new(state.pool(), state.hub())
        .list()
        .await?;
    let subscription = state.hub().subscribe(Collection::Notifications);
    Ok(super::watch_sse(snapshot, subscription))
}
