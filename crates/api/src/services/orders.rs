//! Order placement and removal.
//!
//! Placing an order is the one multi-step write in the catalog: one order-item
//! record per line, a price lookup over those records, then the order itself.
//! The steps are not transactional. A failure part-way leaves the order items
//! already written in place.

use thiserror::Error;

use catalog_core::{OrderId, OrderItemId, Price};

use crate::db::{RepositoryError, Store};
use crate::models::{NewOrder, Order};

/// Errors that can occur while placing or removing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Storage operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// An order item references a product that does not exist.
    #[error("product for order item {0} not found")]
    MissingProduct(OrderItemId),

    /// Fewer order items could be read back than were just written.
    #[error("expected {expected} order items, found {found}")]
    MissingItems { expected: usize, found: usize },

    /// The total does not fit the price type.
    #[error("order total overflowed")]
    TotalOverflow,
}

/// A removed order and how many of its items were removed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedOrder {
    pub order: Order,
    pub removed_items: u64,
}

/// Place an order: write its items, price them, then write the order.
///
/// # Errors
///
/// Returns `OrderError` if any step fails. Items written before the failure
/// are not cleaned up.
pub async fn place_order(store: &dyn Store, order: &NewOrder) -> Result<Order, OrderError> {
    let mut item_ids = Vec::with_capacity(order.order_items.len());
    for item in &order.order_items {
        let created = store.create_order_item(item).await?;
        item_ids.push(created.id);
    }

    let priced = store.priced_order_items(&item_ids).await?;
    if priced.len() != item_ids.len() {
        return Err(OrderError::MissingItems {
            expected: item_ids.len(),
            found: priced.len(),
        });
    }

    let mut total_price = Price::ZERO;
    for item in &priced {
        let unit_price = item.unit_price.ok_or(OrderError::MissingProduct(item.id))?;
        total_price = unit_price
            .line_total(item.quantity)
            .and_then(|line| total_price.checked_add(line))
            .ok_or(OrderError::TotalOverflow)?;
    }

    let created = store
        .create_order(&item_ids, total_price, order.user)
        .await?;

    tracing::info!(
        order_id = %created.id,
        user_id = %created.user,
        items = item_ids.len(),
        total_price = %created.total_price,
        "Order placed"
    );

    Ok(created)
}

/// Remove an order and then all of its items in one bulk call.
///
/// Returns `None` if the order does not exist. A shortfall between the items
/// referenced and the items removed is logged and reported, not treated as an
/// error.
///
/// # Errors
///
/// Returns `OrderError::Repository` if either delete fails.
pub async fn remove_order(
    store: &dyn Store,
    id: OrderId,
) -> Result<Option<RemovedOrder>, OrderError> {
    let Some(order) = store.delete_order(id).await? else {
        return Ok(None);
    };

    let removed_items = store.delete_order_items(&order.order_items).await?;
    let referenced = order.order_items.len() as u64;
    if removed_items < referenced {
        tracing::warn!(
            order_id = %order.id,
            referenced,
            removed = removed_items,
            "Some order items were already gone"
        );
    }

    Ok(Some(RemovedOrder {
        order,
        removed_items,
    }))
}
