//! In-memory [`Store`] used by the route and service tests.
//!
//! Mirrors the `PostgreSQL` semantics that the handlers rely on: ids are
//! assigned on insert, references are not checked, and dangling references
//! resolve to `None`. Setting [`MemoryStore::fail_with`] makes every call
//! return a database error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use catalog_core::{OrderId, OrderItemId, Price, ProductId, UserId};

use super::{OrderRepository, ProductRepository, RepositoryError, Store, UserRepository};
use crate::models::{
    NewOrderItem, NewProduct, Order, OrderDetail, OrderItem, OrderItemDetail, OrderSummary,
    PricedOrderItem, Product, ProductRef, ProductUpdate, User, UserRecord, UserRef,
};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    users: Vec<User>,
    order_items: Vec<OrderItem>,
    orders: Vec<Order>,
    failing: bool,
    ticks: i64,
}

/// Shared in-memory tables. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn fail_with(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of stored order items.
    #[must_use]
    pub fn order_item_count(&self) -> usize {
        self.lock().order_items.len()
    }

    /// Number of stored products.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.lock().products.len()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        let tables = self.lock();
        if tables.failing {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(tables)
    }
}

impl Tables {
    /// Strictly increasing timestamps so ordering by date is deterministic.
    fn now(&mut self) -> chrono::DateTime<Utc> {
        self.ticks += 1;
        Utc::now() + Duration::milliseconds(self.ticks)
    }

    fn user_ref(&self, id: UserId) -> Option<UserRef> {
        self.users.iter().find(|u| u.id == id).map(|u| UserRef {
            id: u.id,
            name: u.name.clone(),
        })
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn order_item(&self, id: OrderItemId) -> Option<&OrderItem> {
        self.order_items.iter().find(|i| i.id == id)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.tables()?.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables()?.product(id).cloned())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables()?;
        let created = Product {
            id: ProductId::generate(),
            name: product.name.clone(),
            description: product.description.clone(),
            detail_description: product.detail_description.clone(),
            image: product.image.clone(),
            images: Vec::new(),
            price: product.price,
            stock: product.stock,
            date_created: tables.now(),
        };
        tables.products.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.tables()?;
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name.clone_from(&update.name);
        product.description.clone_from(&update.description);
        product.detail_description.clone_from(&update.detail_description);
        product.price = update.price;
        product.stock = update.stock;
        Ok(Some(product.clone()))
    }

    async fn set_gallery(
        &self,
        id: ProductId,
        images: &[String],
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.tables()?;
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.images = images.to_vec();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() < before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables()?.users.clone())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: &UserRecord) -> Result<User, RepositoryError> {
        let created = User {
            id: UserId::generate(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_admin: user.is_admin,
        };
        self.tables()?.users.push(created.clone());
        Ok(created)
    }

    async fn replace_user(
        &self,
        id: UserId,
        user: &UserRecord,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables()?;
        let Some(existing) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        existing.name.clone_from(&user.name);
        existing.email = user.email.clone();
        existing.password_hash.clone_from(&user.password_hash);
        existing.is_admin = user.is_admin;
        Ok(Some(existing.clone()))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let tables = self.tables()?;
        let mut orders: Vec<OrderSummary> = tables
            .orders
            .iter()
            .map(|o| OrderSummary {
                id: o.id,
                order_items: o.order_items.clone(),
                total_price: o.total_price,
                user: tables.user_ref(o.user),
                date_ordered: o.date_ordered,
            })
            .collect();
        orders.sort_by(|a, b| b.date_ordered.cmp(&a.date_ordered));
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let tables = self.tables()?;
        let Some(order) = tables.orders.iter().find(|o| o.id == id) else {
            return Ok(None);
        };
        let order_items = order
            .order_items
            .iter()
            .filter_map(|item_id| tables.order_item(*item_id))
            .map(|item| OrderItemDetail {
                id: item.id,
                quantity: item.quantity,
                product: tables.product(item.product).map(|p| ProductRef {
                    id: p.id,
                    name: p.name.clone(),
                    price: p.price,
                }),
            })
            .collect();
        Ok(Some(OrderDetail {
            id: order.id,
            order_items,
            total_price: order.total_price,
            user: tables.user_ref(order.user),
            date_ordered: order.date_ordered,
        }))
    }

    async fn create_order_item(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let created = OrderItem {
            id: OrderItemId::generate(),
            quantity: item.quantity,
            product: item.product,
        };
        self.tables()?.order_items.push(created.clone());
        Ok(created)
    }

    async fn get_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError> {
        Ok(self.tables()?.order_item(id).cloned())
    }

    async fn priced_order_items(
        &self,
        ids: &[OrderItemId],
    ) -> Result<Vec<PricedOrderItem>, RepositoryError> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.order_item(*id))
            .map(|item| PricedOrderItem {
                id: item.id,
                quantity: item.quantity,
                unit_price: tables.product(item.product).map(|p| p.price),
            })
            .collect())
    }

    async fn create_order(
        &self,
        items: &[OrderItemId],
        total_price: Price,
        user: UserId,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables()?;
        let created = Order {
            id: OrderId::generate(),
            order_items: items.to_vec(),
            total_price,
            user,
            date_ordered: tables.now(),
        };
        tables.orders.push(created.clone());
        Ok(created)
    }

    async fn delete_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables()?;
        let Some(index) = tables.orders.iter().position(|o| o.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.orders.remove(index)))
    }

    async fn delete_order_items(&self, ids: &[OrderItemId]) -> Result<u64, RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.order_items.len();
        tables.order_items.retain(|item| !ids.contains(&item.id));
        Ok((before - tables.order_items.len()) as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.tables().map(|_| ())
    }
}
