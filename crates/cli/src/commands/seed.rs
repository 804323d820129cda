//! Seed the database with demo catalog data.
//!
//! Inserts a small set of categories, products, and one demo client, going
//! through the same repositories as the service so every derived field
//! (thresholds, statuses, counters) is computed the usual way. Safe to run
//! once against an empty database; duplicate category names fail the run.

use rust_decimal::Decimal;
use tracing::info;

use terra_verde_admin::db::{CatalogRepository, ClientRepository};
use terra_verde_admin::models::{NewCategory, NewClient, NewProduct};
use terra_verde_admin::watch::ChangeHub;

use super::CommandError;

/// Demo products per category: (name, price in cents, unit, stock, max stock).
const DEMO_PRODUCTS: &[(&str, &[(&str, i64, &str, i32, i32)])] = &[
    (
        "Vegetables",
        &[
            ("Tomatoes", 899, "kg", 40, 60),
            ("Lettuce", 349, "unit", 25, 30),
            ("Carrots", 499, "kg", 5, 50),
        ],
    ),
    (
        "Fruits",
        &[
            ("Oranges", 599, "kg", 80, 100),
            ("Bananas", 449, "kg", 0, 40),
        ],
    ),
    ("Dairy", &[("Minas Cheese", 3290, "kg", 12, 20)]),
];

/// Run the seed.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let hub = ChangeHub::new();
    let catalog = CatalogRepository::new(&pool, &hub);

    for (category_name, products) in DEMO_PRODUCTS {
        let category = catalog
            .create_category(&NewCategory {
                name: (*category_name).to_string(),
            })
            .await?;
        info!(category = %category.name, "category created");

        for (name, price_cents, unit, stock, max_stock) in *products {
            let product = catalog
                .create_product(&NewProduct {
                    category_id: category.id,
                    name: (*name).to_string(),
                    description: None,
                    price: Decimal::new(*price_cents, 2),
                    unit: (*unit).to_string(),
                    stock: *stock,
                    max_stock: *max_stock,
                    images: Vec::new(),
                    published: true,
                })
                .await?;
            info!(product = %product.name, status = %product.status, "product created");
        }
    }

    let client = ClientRepository::new(&pool, &hub)
        .create(&NewClient {
            name: "Maria Oliveira".to_string(),
            email: "maria@example.com".to_string(),
            phone: Some("+55 31 99999-0000".to_string()),
            address: Some("Estrada do Campo 12, Itabirito - MG".to_string()),
        })
        .await?;
    info!(client = %client.name, "demo client created");

    info!("Seed complete!");
    Ok(())
}
