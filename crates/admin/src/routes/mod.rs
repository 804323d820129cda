//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Dashboard
//! GET  /dashboard                   - Overview metrics
//! GET  /dashboard/feed              - Static notification feed
//!
//! # Catalog
//! GET  /categories                  - Category listing
//! POST /categories                  - Create category
//! GET  /categories/{id}/products    - Products of one category
//! GET  /products                    - Product listing (with listing status)
//! POST /products                    - Create product
//! GET  /products/{id}               - Product detail
//! PUT  /products/{id}               - Update product details
//! PUT  /products/{id}/stock         - Edit stock level
//! DELETE /products/{id}             - Delete product
//! GET  /products/watch              - SSE watch stream
//!
//! # Clients (with orders/favorites/coupons/notifications sub-collections)
//! GET  /clients                     - Client listing
//! POST /clients                     - Create client
//! GET  /clients/{id}                - Client detail
//! GET  /clients/{id}/orders         - Client's orders
//! GET  /clients/{id}/favorites      - Client's favorites
//! POST /clients/{id}/favorites/{product_id}   - Add favorite
//! DELETE /clients/{id}/favorites/{product_id} - Remove favorite
//! GET  /clients/{id}/coupons        - Client's coupons
//! POST /clients/{id}/coupons        - Issue coupon
//! POST /clients/{id}/coupons/{coupon_id}/use  - Mark coupon used
//! GET  /clients/{id}/notifications  - Client's notifications
//! POST /clients/{id}/notifications  - Send notification
//! POST /clients/{id}/notifications/{notification_id}/read - Mark read
//! GET  /clients/watch               - SSE watch stream
//!
//! # Orders
//! GET  /orders                      - Order listing
//! POST /orders                      - Place order
//! GET  /orders/{id}                 - Order with items
//! PUT  /orders/{id}/status          - Update status
//! GET  /orders/history              - Grouped history (?granularity=&filter=)
//! GET  /orders/top-products         - Ten best sellers by quantity
//! GET  /orders/watch                - SSE watch stream
//!
//! # Drivers
//! GET  /drivers                     - Driver listing
//! POST /drivers                     - Register driver (provisions account)
//! GET  /drivers/{id}                - Driver detail
//! POST /drivers/{id}/documents      - Upload license / ID card
//! GET  /drivers/{id}/stats          - Live delivery counters
//! GET  /drivers/{id}/deliveries/in-progress - Open deliveries
//! GET  /drivers/{id}/deliveries/history     - Completed deliveries
//! POST /drivers/{id}/deliveries     - Assign delivery
//! POST /drivers/{id}/deliveries/{delivery_id}/complete - Complete delivery
//! POST /drivers/login               - Verify driver credentials
//! GET  /drivers/watch               - SSE watch stream (stats included)
//!
//! # Promotions
//! GET  /promotions                  - Promotion listing (with derived status)
//! POST /promotions                  - Create promotion
//! GET  /promotions/{id}             - Promotion detail
//! POST /promotions/{id}/redeem      - Redeem one use
//! DELETE /promotions/{id}           - Delete promotion
//! GET  /promotions/watch            - SSE watch stream
//!
//! # Notifications
//! GET  /notifications               - Store-wide notifications
//! POST /notifications               - Create notification
//! GET  /notifications/watch         - SSE watch stream
//! ```

use std::convert::Infallible;

use axum::Router;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;

use crate::state::AppState;
use crate::watch::Subscription;

pub mod clients;
pub mod dashboard;
pub mod drivers;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod promotions;

/// Build the admin API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(products::router())
        .merge(clients::router())
        .merge(orders::router())
        .merge(drivers::router())
        .merge(promotions::router())
        .merge(notifications::router())
}

/// Build an SSE response for a watch endpoint: the current snapshot first,
/// then one event per subsequent change. The subscription is detached when
/// the client disconnects and the stream is dropped.
pub(crate) fn watch_sse<T: Serialize + Send + 'static>(
    snapshot: Vec<T>,
    mut subscription: Subscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        match Event::default().event("snapshot").json_data(&snapshot) {
            Ok(event) => yield Ok(event),
            Err(e) => tracing::error!(error = %e, "failed to serialize watch snapshot"),
        }
        drop(snapshot);

        while let Some(change) = subscription.recv().await {
            match Event::default().event("change").json_data(&change) {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::error!(error = %e, "failed to serialize change event"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
