//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use utoipa::ToSchema;

use catalog_core::OrderId;

use crate::error::{AppError, ErrorResponse, Result};
use crate::models::{NewOrder, Order, OrderDetail, OrderSummary};
use crate::routes::parse_id;
use crate::services::orders::{place_order, remove_order};
use crate::state::AppState;

const NOT_FOUND: &str = "the order with the given ID was not found";

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}

/// Envelope returned when an order is deleted.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRemoved {
    pub success: bool,
    pub message: String,
    /// How many of the order's items were removed with it.
    pub removed_items: u64,
}

fn validate(order: &NewOrder) -> Result<()> {
    if order.order_items.is_empty() {
        return Err(AppError::BadRequest(
            "orderItems must contain at least one item".to_string(),
        ));
    }
    for (position, item) in order.order_items.iter().enumerate() {
        if item.quantity == 0 {
            return Err(AppError::BadRequest(format!(
                "orderItems[{position}].quantity must be at least 1"
            )));
        }
        // Quantities are stored in an INTEGER column
        if i32::try_from(item.quantity).is_err() {
            return Err(AppError::BadRequest(format!(
                "orderItems[{position}].quantity must be at most {}",
                i32::MAX
            )));
        }
    }
    Ok(())
}

/// List every order, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    responses(
        (status = 200, description = "All orders, user resolved", body = Vec<OrderSummary>),
        (status = 400, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>> {
    let orders = state.store().list_orders().await.map_err(AppError::query)?;
    Ok(Json(orders))
}

/// Get one order with its user and each item's product resolved.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderDetail),
        (status = 400, description = "Malformed id or storage error", body = ErrorResponse),
        (status = 404, description = "No such order", body = ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>> {
    let id: OrderId = parse_id(&id, "order")?;
    let order = state
        .store()
        .get_order(id)
        .await
        .map_err(AppError::query)?
        .ok_or_else(not_found)?;
    Ok(Json(order))
}

/// Place an order.
///
/// Writes one order item per line, totals `price × quantity` from the current
/// product prices, then writes the order.
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = NewOrder,
    responses(
        (status = 200, description = "The created order", body = Order),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Any failure while placing the order", body = ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<Order>> {
    let Json(order) = body?;
    validate(&order)?;

    let created = place_order(state.store(), &order).await?;
    Ok(Json(created))
}

/// Delete an order and all of its items.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = OrderRemoved),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such order", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderRemoved>> {
    let id: OrderId = parse_id(&id, "order")?;
    let removed = remove_order(state.store(), id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(OrderRemoved {
        success: true,
        message: "the order is deleted".to_string(),
        removed_items: removed.removed_items,
    }))
}
