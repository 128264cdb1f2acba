//! Order repository for database operations.
//!
//! Orders keep their item ids in a `UUID[]` column so the placement order is
//! preserved. Reads resolve references with `LEFT JOIN`s; a dangling reference
//! comes back as `None` rather than failing the read.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_core::{OrderId, OrderItemId, Price, ProductId, UserId};

use super::{OrderRepository, PgStore, RepositoryError, quantity_from_db, quantity_to_db};
use crate::models::{
    NewOrderItem, Order, OrderDetail, OrderItem, OrderItemDetail, OrderSummary, PricedOrderItem,
    ProductRef, UserRef,
};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_items: Vec<OrderItemId>,
    total_price: Price,
    user_id: UserId,
    date_ordered: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_items: row.order_items,
            total_price: row.total_price,
            user: row.user_id,
            date_ordered: row.date_ordered,
        }
    }
}

/// An order joined with its user's name.
#[derive(Debug, sqlx::FromRow)]
struct OrderWithUserRow {
    id: OrderId,
    order_items: Vec<OrderItemId>,
    total_price: Price,
    user_id: UserId,
    user_name: Option<String>,
    date_ordered: DateTime<Utc>,
}

impl OrderWithUserRow {
    fn user_ref(&self) -> Option<UserRef> {
        self.user_name.as_ref().map(|name| UserRef {
            id: self.user_id,
            name: name.clone(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    quantity: i32,
    product_id: ProductId,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            quantity: quantity_from_db(row.quantity)?,
            product: row.product_id,
        })
    }
}

/// An order item joined with its product's name and price.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemProductRow {
    id: OrderItemId,
    quantity: i32,
    product_id: ProductId,
    product_name: Option<String>,
    product_price: Option<Price>,
}

impl TryFrom<OrderItemProductRow> for OrderItemDetail {
    type Error = RepositoryError;

    fn try_from(row: OrderItemProductRow) -> Result<Self, Self::Error> {
        let product = match (row.product_name, row.product_price) {
            (Some(name), Some(price)) => Some(ProductRef {
                id: row.product_id,
                name,
                price,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            quantity: quantity_from_db(row.quantity)?,
            product,
        })
    }
}

const ORDER_ITEMS_WITH_PRODUCT: &str = r"
    SELECT oi.id, oi.quantity, oi.product_id,
           p.name AS product_name, p.price AS product_price
    FROM order_items oi
    LEFT JOIN products p ON p.id = oi.product_id
    WHERE oi.id = ANY($1)
";

impl PgStore {
    /// Fetch the given items with their products, in the order of `ids`.
    async fn order_items_with_product(
        &self,
        ids: &[OrderItemId],
    ) -> Result<Vec<OrderItemProductRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemProductRow>(ORDER_ITEMS_WITH_PRODUCT)
            .bind(ids)
            .fetch_all(self.pool())
            .await?;

        let mut by_id: HashMap<OrderItemId, OrderItemProductRow> =
            rows.into_iter().map(|row| (row.id, row)).collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithUserRow>(
            r"
            SELECT o.id, o.order_items, o.total_price, o.user_id,
                   u.name AS user_name, o.date_ordered
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.date_ordered DESC
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| OrderSummary {
                user: row.user_ref(),
                id: row.id,
                order_items: row.order_items,
                total_price: row.total_price,
                date_ordered: row.date_ordered,
            })
            .collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderWithUserRow>(
            r"
            SELECT o.id, o.order_items, o.total_price, o.user_id,
                   u.name AS user_name, o.date_ordered
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_items = self
            .order_items_with_product(&row.order_items)
            .await?
            .into_iter()
            .map(OrderItemDetail::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderDetail {
            user: row.user_ref(),
            id: row.id,
            order_items,
            total_price: row.total_price,
            date_ordered: row.date_ordered,
        }))
    }

    async fn create_order_item(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let row = sqlx::query_as::<_, OrderItemRow>(
            r"
            INSERT INTO order_items (quantity, product_id)
            VALUES ($1, $2)
            RETURNING id, quantity, product_id
            ",
        )
        .bind(quantity_to_db(item.quantity)?)
        .bind(item.product)
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    async fn get_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, quantity, product_id FROM order_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(OrderItem::try_from).transpose()
    }

    async fn priced_order_items(
        &self,
        ids: &[OrderItemId],
    ) -> Result<Vec<PricedOrderItem>, RepositoryError> {
        self.order_items_with_product(ids)
            .await?
            .into_iter()
            .map(|row| {
                Ok(PricedOrderItem {
                    id: row.id,
                    quantity: quantity_from_db(row.quantity)?,
                    unit_price: row.product_price,
                })
            })
            .collect()
    }

    async fn create_order(
        &self,
        items: &[OrderItemId],
        total_price: Price,
        user: UserId,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (order_items, total_price, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, order_items, total_price, user_id, date_ordered
            ",
        )
        .bind(items)
        .bind(total_price)
        .bind(user)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn delete_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            DELETE FROM orders
            WHERE id = $1
            RETURNING id, order_items, total_price, user_id, date_ordered
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Order::from))
    }

    async fn delete_order_items(&self, ids: &[OrderItemId]) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = ANY($1)")
            .bind(ids)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
