//! Terra Verde Admin library.
//!
//! Administrative backend for the Terra Verde store: catalog, clients,
//! orders, delivery drivers, promotions, and notifications, exposed as a
//! JSON HTTP API with SSE watch streams.
//!
//! The crate is a library so the service can be exercised from tests and
//! reused by the CLI; the binary in `main.rs` only wires configuration,
//! logging, and the router together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod watch;
