//! Terra Verde Core - Shared types library.
//!
//! This crate provides common types used across all Terra Verde components:
//! - `admin` - Administrative backend for the store
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain rules - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses
//! - [`stock`] - Stock threshold and status derivation rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod stock;
pub mod types;

pub use stock::*;
pub use types::*;
