//! Integration tests for catalog management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin service running (cargo run -p terra-verde-admin)
//!
//! Run with: cargo test -p terra-verde-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use terra_verde_integration_tests::admin_base_url;

/// Test helper: create a category and return its JSON.
async fn create_category(client: &Client, name: &str) -> Value {
    let resp = client
        .post(format!("{}/categories", admin_base_url()))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create category");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse category")
}

#[tokio::test]
#[ignore = "Requires running admin service and database"]
async fn test_product_lifecycle() {
    let client = Client::new();
    let base_url = admin_base_url();

    let category = create_category(&client, &format!("it-cat-{}", std::process::id())).await;
    let category_id = category["id"].as_i64().expect("category id");

    // Create: stock 8 of max 60 -> minimum 6 -> in-stock (8 > 6).
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "category_id": category_id,
            "name": "Integration Tomatoes",
            "price": "8.99",
            "unit": "kg",
            "stock": 8,
            "max_stock": 60
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let product: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(product["min_stock"], 6);
    assert_eq!(product["status"], "in-stock");
    let product_id = product["id"].as_i64().expect("product id");

    // Edit stock to the boundary: 6 <= 6 -> low-stock.
    let resp = client
        .put(format!("{base_url}/products/{product_id}/stock"))
        .json(&json!({ "stock": 6 }))
        .send()
        .await
        .expect("Failed to set stock");
    assert_eq!(resp.status(), StatusCode::OK);

    let product: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(product["status"], "low-stock");

    // Zero stock -> out-of-stock (three-way rule).
    let resp = client
        .put(format!("{base_url}/products/{product_id}/stock"))
        .json(&json!({ "stock": 0 }))
        .send()
        .await
        .expect("Failed to set stock");
    let product: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(product["status"], "out-of-stock");

    // The listing's two-way status has no zero case.
    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products");
    let listing: Vec<Value> = resp.json().await.expect("Failed to parse listing");
    let entry = listing
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .expect("product in listing");
    assert_eq!(entry["listing_status"], "low-stock");

    // Cleanup.
    let resp = client
        .delete(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running admin service and database"]
async fn test_invalid_product_is_rejected() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/products", admin_base_url()))
        .json(&json!({
            "category_id": 1,
            "name": "",
            "price": "1.00",
            "unit": "kg",
            "stock": 1,
            "max_stock": 10
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
