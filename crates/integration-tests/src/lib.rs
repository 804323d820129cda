//! Integration tests for Terra Verde.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p terra-verde-cli -- migrate
//!
//! # Start the admin service
//! cargo run -p terra-verde-admin
//!
//! # Run integration tests
//! cargo test -p terra-verde-integration-tests -- --ignored
//! ```
//!
//! Tests target a running service over HTTP and are `#[ignore]`d by default
//! so `cargo test` stays hermetic.

#![cfg_attr(not(test), forbid(unsafe_code))]

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("TERRA_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}
