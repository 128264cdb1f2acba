//! Order and order-item domain types.
//!
//! An order references standalone order-item records by id. Reads come in
//! three shapes: the bare [`Order`] returned on creation, the list view
//! [`OrderSummary`] with the user resolved to its name, and the detail view
//! [`OrderDetail`] with every item's product resolved as well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use catalog_core::{OrderId, OrderItemId, Price, ProductId, UserId};

/// A purchased quantity of one product, stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub product: ProductId,
}

/// Input for one line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewOrderItem {
    #[schema(minimum = 1, maximum = 2147483647, example = 2)]
    pub quantity: u32,
    pub product: ProductId,
}

/// Validated input for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_items: Vec<NewOrderItem>,
    pub user: UserId,
}

/// An order item joined with its product's current unit price.
///
/// `unit_price` is `None` when the referenced product no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedOrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub unit_price: Option<Price>,
}

/// A stored order with unresolved references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_items: Vec<OrderItemId>,
    /// Sum of `price × quantity` over the items, fixed at creation time.
    pub total_price: Price,
    pub user: UserId,
    pub date_ordered: DateTime<Utc>,
}

/// A user reference resolved to its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

/// A product reference resolved to its name and current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
}

/// List view of an order. `user` is `null` when the user no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_items: Vec<OrderItemId>,
    pub total_price: Price,
    pub user: Option<UserRef>,
    pub date_ordered: DateTime<Utc>,
}

/// An order item with its product resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub id: OrderItemId,
    pub quantity: u32,
    pub product: Option<ProductRef>,
}

/// Detail view of an order.
///
/// Items whose record has been removed are left out, in the order the
/// remaining ones were placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: OrderId,
    pub order_items: Vec<OrderItemDetail>,
    pub total_price: Price,
    pub user: Option<UserRef>,
    pub date_ordered: DateTime<Utc>,
}
