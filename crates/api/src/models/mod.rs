//! Domain models for the catalog.
//!
//! These types represent validated domain objects, separate from database row
//! types. Response types serialize with camelCase keys (`detailDescription`,
//! `totalPrice`, `dateOrdered`).

pub mod order;
pub mod product;
pub mod user;

pub use order::{
    NewOrder, NewOrderItem, Order, OrderDetail, OrderItem, OrderItemDetail, OrderSummary,
    PricedOrderItem, ProductRef, UserRef,
};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{User, UserRecord};
