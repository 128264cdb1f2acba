//! Catalog Core - Shared types library.
//!
//! This crate provides the domain types used across the catalog components:
//! - `api` - The REST server for products, users and orders
//! - `cli` - Command-line tools for migrations and user bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. Database and `OpenAPI` support are opt-in through the
//! `postgres` and `openapi` features.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and image types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
