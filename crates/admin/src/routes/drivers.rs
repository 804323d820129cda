//! Driver route handlers: registration (account provisioning + driver row),
//! document uploads, live delivery counters, and deliveries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use terra_verde_core::{DeliveryId, DriverAccountId, DriverId};

use crate::db::DriverRepository;
use crate::error::AppError;
use crate::models::driver::Delivery;
use crate::models::{DocumentKind, Driver, DriverStats, NewDelivery, NewDriver};
use crate::services::storage;
use crate::state::AppState;
use crate::watch::Collection;

/// Build the drivers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/watch", get(watch_drivers))
        .route("/drivers/login", post(login))
        .route("/drivers/{id}", get(get_driver))
        .route("/drivers/{id}/documents", post(upload_document))
        .route("/drivers/{id}/stats", get(get_stats))
        .route("/drivers/{id}/deliveries", post(start_delivery))
        .route(
            "/drivers/{id}/deliveries/in-progress",
            get(list_in_progress),
        )
        .route("/drivers/{id}/deliveries/history", get(list_history))
        .route(
            "/drivers/{id}/deliveries/{delivery_id}/complete",
            post(complete_delivery),
        )
}

/// Body for uploading a driver document as a data URL.
#[derive(Debug, Deserialize)]
pub struct DocumentUpload {
    /// Which document this is.
    pub kind: DocumentKind,
    /// Original filename.
    pub filename: String,
    /// The document as a base64 data URL.
    pub data_url: String,
}

/// Body for verifying driver credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful credential check.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account_id: DriverAccountId,
}

/// List all drivers.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, AppError> {
    let drivers = DriverRepository::new(state.pool(), state.hub()).list().await?;
    Ok(Json(drivers))
}

/// Register a driver: provision the login account, then insert the driver
/// row referencing it.
///
/// The two writes are independent. If the driver insert fails, the account
/// is left behind as an orphan; that is logged and accepted, not rolled
/// back.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email already has an
/// account, or a write fails.
#[instrument(skip(state, input))]
pub async fn create_driver(
    State(state): State<AppState>,
    Json(input): Json<NewDriver>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let account_id = state
        .identity()
        .provision(&input.email, &input.password)
        .await?;

    let driver = DriverRepository::new(state.pool(), state.hub())
        .create(&input, account_id)
        .await
        .inspect_err(|e| {
            tracing::warn!(
                error = %e,
                %account_id,
                email = %input.email,
                "driver insert failed after account provisioning; account is orphaned"
            );
        })?;

    Ok((StatusCode::CREATED, Json(driver)))
}

/// Get a driver.
///
/// # Errors
///
/// Returns an error if the driver does not exist or the query fails.
pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Driver>, AppError> {
    let driver = DriverRepository::new(state.pool(), state.hub())
        .get(DriverId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("driver {id}")))?;
    Ok(Json(driver))
}

/// Upload a driver document (license or ID card). The blob lands in object
/// storage under a timestamp-prefixed key and the public URL is stored on
/// the driver row.
///
/// # Errors
///
/// Returns an error if the data URL is invalid, the upload fails, or the
/// driver does not exist.
#[instrument(skip(state, upload))]
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(upload): Json<DocumentUpload>,
) -> Result<Json<Driver>, AppError> {
    let bytes = storage::decode_data_url(&upload.data_url)?;

    let url = state
        .storage()
        .upload(upload.kind.folder(), &upload.filename, bytes)
        .await?;

    let driver = DriverRepository::new(state.pool(), state.hub())
        .set_document_url(DriverId::new(id), upload.kind, &url)
        .await?;

    Ok(Json(driver))
}

/// Live delivery counters for a driver.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DriverStats>, AppError> {
    let stats = DriverRepository::new(state.pool(), state.hub())
        .stats(DriverId::new(id))
        .await?;
    Ok(Json(stats))
}

/// Assign a delivery to a driver.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn start_delivery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<NewDelivery>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    let delivery = DriverRepository::new(state.pool(), state.hub())
        .start_delivery(DriverId::new(id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

/// Complete an in-progress delivery.
///
/// # Errors
///
/// Returns an error if no such in-progress delivery exists or the update
/// fails.
pub async fn complete_delivery(
    State(state): State<AppState>,
    Path((id, delivery_id)): Path<(i32, i32)>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = DriverRepository::new(state.pool(), state.hub())
        .complete_delivery(DriverId::new(id), DeliveryId::new(delivery_id))
        .await?;
    Ok(Json(delivery))
}

/// List a driver's in-progress deliveries.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_in_progress(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Delivery>>, AppError> {
    let deliveries = DriverRepository::new(state.pool(), state.hub())
        .list_in_progress(DriverId::new(id))
        .await?;
    Ok(Json(deliveries))
}

/// List a driver's completed deliveries.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Delivery>>, AppError> {
    let deliveries = DriverRepository::new(state.pool(), state.hub())
        .list_history(DriverId::new(id))
        .await?;
    Ok(Json(deliveries))
}

/// Verify driver credentials.
///
/// # Errors
///
/// Returns an error for unknown or wrong credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let account_id = state
        .identity()
        .verify(&request.email, &request.password)
        .await?;
    Ok(Json(LoginResponse { account_id }))
}

/// Watch the drivers collection: current snapshot, then every change,
/// including refreshed delivery counters.
///
/// # Errors
///
/// Returns an error if the snapshot query fails.
pub async fn watch_drivers(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot = DriverRepository::new(state.pool(), state.hub()).list().await?;
    let subscription = state.hub().subscribe(Collection::Drivers);
    Ok(super::watch_sse(snapshot, subscription))
}
