//! Promotion route handlers. Responses carry the status derived from the
//! validity window at request time.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use terra_verde_core::{PromotionId, PromotionStatus};

use crate::db::PromotionRepository;
use crate::error::AppError;
use crate::models::{NewPromotion, Promotion};
use crate::state::AppState;
use crate::watch::Collection;

/// Build the promotions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/promotions", get(list_promotions).post(create_promotion))
        .route("/promotions/watch", get(watch_promotions))
        .route(
            "/promotions/{id}",
            get(get_promotion).delete(delete_promotion),
        )
        .route("/promotions/{id}/redeem", post(redeem_promotion))
}

/// A promotion with its derived lifecycle status and exhaustion flag.
#[derive(Debug, Serialize)]
pub struct PromotionView {
    #[serde(flatten)]
    pub promotion: Promotion,
    /// Derived from the validity window at request time.
    pub status: PromotionStatus,
    /// Whether the usage cap has been reached.
    pub exhausted: bool,
}

impl From<Promotion> for PromotionView {
    fn from(promotion: Promotion) -> Self {
        let status = promotion.status(Utc::now());
        let exhausted = promotion.is_exhausted();
        Self {
            promotion,
            status,
            exhausted,
        }
    }
}

/// List all promotions with derived statuses.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_promotions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromotionView>>, AppError> {
    let promotions = PromotionRepository::new(state.pool(), state.hub())
        .list()
        .await?;
    Ok(Json(promotions.into_iter().map(Into::into).collect()))
}

/// Create a promotion.
///
/// # Errors
///
/// Returns an error if the input is invalid or the insert fails.
pub async fn create_promotion(
    State(state): State<AppState>,
    Json(input): Json<NewPromotion>,
) -> Result<(StatusCode, Json<PromotionView>), AppError> {
    let promotion = PromotionRepository::new(state.pool(), state.hub())
        .create(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(promotion.into())))
}

/// Get a promotion with its derived status.
///
/// # Errors
///
/// Returns an error if the promotion does not exist or the query fails.
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PromotionView>, AppError> {
    let promotion = PromotionRepository::new(state.pool(), state.hub())
        .get(PromotionId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("promotion {id}")))?;
    Ok(Json(promotion.into()))
}

/// Redeem one use of a promotion.
///
/// # Errors
///
/// Returns an error if the promotion does not exist, is not active, or is
/// at its usage cap.
pub async fn redeem_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PromotionView>, AppError> {
    let promotion = PromotionRepository::new(state.pool(), state.hub())
        .redeem(PromotionId::new(id))
        .await?;
    Ok(Json(promotion.into()))
}

/// Delete a promotion.
///
/// # Errors
///
/// Returns an error if the promotion does not exist or the delete fails.
pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    PromotionRepository::new(state.pool(), state.hub())
        .delete(PromotionId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Watch the promotions collection: current snapshot, then every change.
///
/// # Errors
///
/// Returns an error if the snapshot query fails.
pub async fn watch_promotions(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot: Vec<PromotionView> = PromotionRepository::new(state.pool(), state.hub())
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let subscription = state.hub().subscribe(Collection::Promotions);
    Ok(super::watch_sse(snapshot, subscription))
}
