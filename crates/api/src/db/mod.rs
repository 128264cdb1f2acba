//! Database operations for the catalog `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts with argon2 password hashes
//! - `products` - Catalog products, including the image gallery (`TEXT[]`)
//! - `order_items` - Standalone product/quantity lines
//! - `orders` - Orders referencing their items by id (`UUID[]`)
//!
//! References between tables are plain id columns without foreign keys, so a
//! removed product or user resolves to `null` when an order is read back.
//!
//! # Repositories
//!
//! Route handlers talk to storage through the [`ProductRepository`],
//! [`UserRepository`] and [`OrderRepository`] traits, bundled as [`Store`].
//! [`PgStore`] is the `PostgreSQL` implementation; tests use an in-memory one.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p catalog-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod users;

#[cfg(test)]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use catalog_core::{OrderId, OrderItemId, ProductId, UserId};

use crate::models::{
    NewOrderItem, NewProduct, Order, OrderDetail, OrderItem, OrderSummary, PricedOrderItem,
    Product, ProductUpdate, User, UserRecord,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Storage operations on products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, unfiltered and unpaginated.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// One product, or `None` if the id is unknown.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product with an empty gallery.
    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Replace every mutable field except the images.
    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Replace the gallery with `images`.
    async fn set_gallery(
        &self,
        id: ProductId,
        images: &[String],
    ) -> Result<Option<Product>, RepositoryError>;

    /// Remove a product. Returns `false` if it did not exist.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Storage operations on users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// One user, or `None` if the id is unknown.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a user. Emails are not required to be unique.
    async fn create_user(&self, user: &UserRecord) -> Result<User, RepositoryError>;

    /// Overwrite name, email, password hash and admin flag.
    async fn replace_user(
        &self,
        id: UserId,
        user: &UserRecord,
    ) -> Result<Option<User>, RepositoryError>;

    /// Remove a user. Returns `false` if it did not exist.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;
}

/// Storage operations on orders and their items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// All orders with the user resolved, newest first.
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, RepositoryError>;

    /// One order with the user and every item's product resolved.
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError>;

    /// Insert one standalone order item.
    async fn create_order_item(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError>;

    /// One order item, or `None` if the id is unknown.
    async fn get_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError>;

    /// The given items joined with their product's current price.
    ///
    /// Unknown item ids are skipped.
    async fn priced_order_items(
        &self,
        ids: &[OrderItemId],
    ) -> Result<Vec<PricedOrderItem>, RepositoryError>;

    /// Insert an order referencing already-stored items.
    async fn create_order(
        &self,
        items: &[OrderItemId],
        total_price: catalog_core::Price,
        user: UserId,
    ) -> Result<Order, RepositoryError>;

    /// Remove an order and return it, or `None` if it did not exist.
    ///
    /// Its items are left in place.
    async fn delete_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Remove every order item in `ids` in one call.
    ///
    /// Returns how many were actually removed.
    async fn delete_order_items(&self, ids: &[OrderItemId]) -> Result<u64, RepositoryError>;
}

/// The full storage surface used by the HTTP layer.
#[async_trait]
pub trait Store: ProductRepository + UserRepository + OrderRepository {
    /// Check that the backing database is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Convert a stored quantity into the domain's unsigned type.
fn quantity_from_db(quantity: i32) -> Result<u32, RepositoryError> {
    u32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative quantity: {quantity}")))
}

/// Convert a domain quantity into the `INTEGER` column type.
fn quantity_to_db(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("quantity too large: {quantity}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_conversions() {
        assert_eq!(quantity_from_db(3).ok(), Some(3));
        assert!(matches!(
            quantity_from_db(-1),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert_eq!(quantity_to_db(7).ok(), Some(7));
        assert!(quantity_to_db(u32::MAX).is_err());
    }
}
