//! Integration tests for orders and the history aggregation endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin service running (cargo run -p terra-verde-admin)
//!
//! Run with: cargo test -p terra-verde-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use terra_verde_integration_tests::admin_base_url;

#[tokio::test]
#[ignore = "Requires running admin service and database"]
async fn test_order_history_groups_partition_orders() {
    let client = Client::new();
    let base_url = admin_base_url();

    let orders: Vec<Value> = client
        .get(format!("{base_url}/orders"))
        .send()
        .await
        .expect("Failed to list orders")
        .json()
        .await
        .expect("Failed to parse orders");

    for granularity in ["day", "month", "year"] {
        let groups: Vec<Value> = client
            .get(format!("{base_url}/orders/history?granularity={granularity}"))
            .send()
            .await
            .expect("Failed to fetch history")
            .json()
            .await
            .expect("Failed to parse history");

        let grouped_count: usize = groups
            .iter()
            .map(|g| g["orders"].as_array().map_or(0, Vec::len))
            .sum();
        assert_eq!(
            grouped_count,
            orders.len(),
            "grouping by {granularity} lost or duplicated orders"
        );

        // Labels sorted descending, lexicographically.
        let labels: Vec<&str> = groups
            .iter()
            .filter_map(|g| g["label"].as_str())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(labels, sorted);
    }
}

#[tokio::test]
#[ignore = "Requires running admin service and database"]
async fn test_order_history_rejects_unknown_granularity() {
    let client = Client::new();

    let resp = client
        .get(format!(
            "{}/orders/history?granularity=week",
            admin_base_url()
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running admin service and database"]
async fn test_top_products_is_capped_at_ten() {
    let client = Client::new();

    let top: Vec<Value> = client
        .get(format!("{}/orders/top-products", admin_base_url()))
        .send()
        .await
        .expect("Failed to fetch top products")
        .json()
        .await
        .expect("Failed to parse top products");

    assert!(top.len() <= 10);

    // Sorted descending by quantity.
    let quantities: Vec<i64> = top.iter().filter_map(|p| p["quantity"].as_i64()).collect();
    let mut sorted = quantities.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(quantities, sorted);
}

#[tokio::test]
#[ignore = "Requires running admin service and database"]
async fn test_order_with_unknown_product_is_rejected() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/orders", admin_base_url()))
        .json(&json!({
            "client_id": 1,
            "items": [{ "product_id": 999_999, "quantity": 1 }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
