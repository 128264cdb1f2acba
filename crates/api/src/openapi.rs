//! Generated OpenAPI document.
//!
//! Paths come from the `#[utoipa::path]` annotations next to each handler.
//! The document is built once at startup and served as static JSON.

use utoipa::OpenApi;
use utoipa::openapi::{self, server::ServerBuilder};

use crate::error::ErrorResponse;
use crate::models::{
    NewOrder, NewOrderItem, Order, OrderDetail, OrderItemDetail, OrderSummary, Product,
    ProductRef, User, UserRef,
};
use crate::routes::{self, StatusMessage};

/// Path the document is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        description = "Products, users and orders for an e-commerce catalog"
    ),
    paths(
        routes::health::health,
        routes::health::readiness,
        routes::products::list_products,
        routes::products::get_product,
        routes::products::create_product,
        routes::products::update_product,
        routes::products::update_gallery,
        routes::products::delete_product,
        routes::users::list_users,
        routes::users::get_user,
        routes::users::create_user,
        routes::users::update_user,
        routes::users::delete_user,
        routes::orders::list_orders,
        routes::orders::get_order,
        routes::orders::create_order,
        routes::orders::delete_order,
    ),
    components(schemas(
        Product,
        User,
        Order,
        OrderSummary,
        OrderDetail,
        OrderItemDetail,
        NewOrder,
        NewOrderItem,
        UserRef,
        ProductRef,
        StatusMessage,
        ErrorResponse,
        routes::products::BinaryFile,
        routes::products::CreateProductForm,
        routes::products::GalleryForm,
        routes::products::ProductUpdateRequest,
        routes::users::UserRequest,
        routes::orders::OrderRemoved,
    )),
    tags(
        (name = "products", description = "Catalog products and their images"),
        (name = "users", description = "User accounts"),
        (name = "orders", description = "Orders and their items"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;

/// Build the document, advertising `base_url` as the only server.
#[must_use]
pub fn document(base_url: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![ServerBuilder::new().url(base_url).build()]);
    doc
}
