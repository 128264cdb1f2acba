//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database ping)
//! GET  /api-docs/openapi.json       - OpenAPI document
//! GET  /public/uploads/{file}       - Uploaded images
//!
//! # Products
//! GET    /products                    - List products
//! POST   /products                    - Create product (multipart, field `image`)
//! GET    /products/{id}               - Get product
//! PUT    /products/{id}               - Update product fields (JSON)
//! DELETE /products/{id}               - Delete product
//! PUT    /products/gallery-images/{id} - Replace gallery (multipart, field `images`)
//!
//! # Users
//! GET    /users        - List users
//! POST   /users        - Create user
//! GET    /users/{id}   - Get user
//! PUT    /users/{id}   - Replace user
//! DELETE /users/{id}   - Delete user
//!
//! # Orders
//! GET    /orders       - List orders (newest first)
//! POST   /orders       - Place order
//! GET    /orders/{id}  - Get order with items and products
//! DELETE /orders/{id}  - Delete order and its items
//! ```

pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, put},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Largest accepted request body on the product routes (ten gallery images).
pub const MAX_UPLOAD_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Envelope returned by deletes and other message-only responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

impl StatusMessage {
    /// A `success: true` envelope.
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// Parse a path id, answering 400 when it is malformed.
pub(crate) fn parse_id<T: FromStr>(raw: &str, resource: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {resource} id: {raw}")))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/gallery-images/{id}", put(products::update_gallery))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route("/{id}", get(orders::get_order).delete(orders::delete_order))
}

/// Create all resource and health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/users", user_routes())
        .nest("/orders", order_routes())
}
