//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use catalog_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub detail_description: String,
    /// Absolute URL of the primary image.
    pub image: String,
    /// Absolute URLs of the gallery images, in upload order.
    pub images: Vec<String>,
    pub price: Price,
    pub stock: i32,
    pub date_created: DateTime<Utc>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub detail_description: String,
    pub image: String,
    pub price: Price,
    pub stock: i32,
}

/// Validated replacement for a product's mutable fields.
///
/// The primary image and the gallery are managed by the upload routes and are
/// not touched by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub detail_description: String,
    pub price: Price,
    pub stock: i32,
}
