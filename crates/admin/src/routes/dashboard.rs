//! Dashboard route handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::db::{CatalogRepository, ClientRepository, OrderRepository};
use crate::models::{FeedItem, Order, notification::seeded_feed};
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/feed", get(feed))
}

/// Dashboard overview metrics.
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    /// Total order count.
    pub orders: usize,
    /// Revenue across all orders.
    pub revenue: Decimal,
    /// Total client count.
    pub clients: usize,
    /// Total product count.
    pub products: usize,
}

/// Dashboard response: metrics plus the most recent orders.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub metrics: DashboardMetrics,
    pub recent_orders: Vec<Order>,
}

/// Dashboard overview. Each section is fetched in parallel; a failed section
/// is logged and rendered empty rather than failing the page.
#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let order_repo = OrderRepository::new(state.pool(), state.hub());
    let client_repo = ClientRepository::new(state.pool(), state.hub());
    let catalog_repo = CatalogRepository::new(state.pool(), state.hub());
    let orders_future = order_repo.list();
    let clients_future = client_repo.list();
    let products_future = catalog_repo.list_products();

    let (orders_result, clients_result, products_result) =
        tokio::join!(orders_future, clients_future, products_future);

    let (order_count, revenue, recent_orders) = match orders_result {
        Ok(orders) => {
            let count = orders.len();
            let revenue: Decimal = orders.iter().map(|o| o.total).sum();
            let recent: Vec<Order> = orders.into_iter().take(5).collect();
            (count, revenue, recent)
        }
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            (0, Decimal::ZERO, vec![])
        }
    };

    let client_count = match clients_result {
        Ok(clients) => clients.len(),
        Err(e) => {
            tracing::error!("Failed to fetch clients: {e}");
            0
        }
    };

    let product_count = match products_result {
        Ok(products) => products.len(),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            0
        }
    };

    Json(DashboardResponse {
        metrics: DashboardMetrics {
            orders: order_count,
            revenue,
            clients: client_count,
            products: product_count,
        },
        recent_orders,
    })
}

/// The static, locally seeded notification feed. Not persisted; resets on
/// every process start.
pub async fn feed() -> Json<Vec<FeedItem>> {
    Json(seeded_feed())
}
