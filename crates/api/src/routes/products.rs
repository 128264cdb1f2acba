//! Product route handlers.
//!
//! Create and gallery updates take `multipart/form-data`; the stored image
//! URLs are absolute and built from the request's own origin.

use axum::{
    Json,
    extract::{
        Multipart, Path, State, multipart::MultipartRejection, rejection::JsonRejection,
    },
};
use serde::Deserialize;
use utoipa::ToSchema;

use catalog_core::{Price, ProductId};

use crate::error::{AppError, ErrorResponse, Result};
use crate::middleware::RequestOrigin;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::routes::{StatusMessage, parse_id};
use crate::services::uploads::{MAX_GALLERY_IMAGES, UploadError, UploadForm, public_url};
use crate::state::AppState;

const NOT_FOUND: &str = "the product with the given ID was not found";

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}

/// Uploaded file in a multipart form.
#[derive(ToSchema)]
#[schema(value_type = String, format = Binary)]
#[allow(dead_code)]
pub struct BinaryFile(Vec<u8>);

/// Multipart form for `POST /products`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CreateProductForm {
    #[schema(example = "Shirt")]
    name: String,
    description: String,
    detail_description: Option<String>,
    #[schema(value_type = f64, example = 1000)]
    price: String,
    #[schema(example = 5)]
    stock: i32,
    /// Primary image (`image/png`, `image/jpeg` or `image/jpg`).
    #[schema(value_type = BinaryFile)]
    image: String,
}

/// Multipart form for `PUT /products/gallery-images/{id}`.
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct GalleryForm {
    /// One to ten images, replacing the current gallery.
    #[schema(value_type = Vec<BinaryFile>)]
    images: Vec<String>,
}

/// JSON body for `PUT /products/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub detail_description: String,
    pub price: Price,
    pub stock: i32,
}

impl ProductUpdateRequest {
    fn validate(self) -> Result<ProductUpdate> {
        Ok(ProductUpdate {
            name: non_empty("name", &self.name)?.to_string(),
            description: self.description,
            detail_description: self.detail_description,
            price: Price::new(self.price.amount())
                .map_err(|e| AppError::BadRequest(format!("price: {e}")))?,
            stock: non_negative_stock(self.stock)?,
        })
    }
}

/// Text fields of a product-creation form, validated.
struct ProductFields {
    name: String,
    description: String,
    detail_description: String,
    price: Price,
    stock: i32,
}

impl ProductFields {
    fn from_form(form: &UploadForm) -> Result<Self> {
        let required = |key: &str| {
            form.field(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::BadRequest(format!("{key} is required")))
        };

        let name = required("name")?.to_string();
        let description = required("description")?.to_string();
        let price = required("price")?
            .parse::<Price>()
            .map_err(|e| AppError::BadRequest(format!("price: {e}")))?;
        let stock = required("stock")?
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest("stock must be an integer".to_string()))?;

        Ok(Self {
            name,
            description,
            detail_description: form
                .field("detailDescription")
                .unwrap_or_default()
                .to_string(),
            price,
            stock: non_negative_stock(stock)?,
        })
    }

    fn with_image(self, image: String) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            detail_description: self.detail_description,
            image,
            price: self.price,
            stock: self.stock,
        }
    }
}

fn non_empty<'a>(key: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{key} is required")));
    }
    Ok(value)
}

fn non_negative_stock(stock: i32) -> Result<i32> {
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }
    Ok(stock)
}

/// List every product.
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 400, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state
        .store()
        .list_products()
        .await
        .map_err(AppError::query)?;
    Ok(Json(products))
}

/// Get one product.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 400, description = "Malformed id or storage error", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "product")?;
    let product = state
        .store()
        .get_product(id)
        .await
        .map_err(AppError::query)?
        .ok_or_else(not_found)?;
    Ok(Json(product))
}

/// Create a product with its primary image.
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body(content = CreateProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "The created product", body = Product),
        (status = 400, description = "Missing or invalid image or field", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    origin: RequestOrigin,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>> {
    let form = UploadForm::read(multipart?, "image", 1).await?;
    let upload = form.files.first().ok_or(UploadError::NoImage)?;
    let fields = ProductFields::from_form(&form)?;

    let file_name = state.uploads().save(upload).await?;
    let product = fields.with_image(public_url(origin.as_str(), &file_name)?);
    let created = state.store().create_product(&product).await?;

    tracing::info!(product_id = %created.id, image = %created.image, "Product created");
    Ok(Json(created))
}

/// Replace a product's fields, leaving its images untouched.
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductUpdateRequest,
    responses(
        (status = 200, description = "The updated product", body = Product),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductUpdateRequest>, JsonRejection>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "product")?;
    let Json(body) = body?;
    let update = body.validate()?;

    let product = state
        .store()
        .update_product(id, &update)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(product))
}

/// Replace a product's gallery with the uploaded images.
#[utoipa::path(
    put,
    path = "/products/gallery-images/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product id")),
    request_body(content = GalleryForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "The product with its new gallery", body = Product),
        (status = 400, description = "Missing, too many or invalid images, or storage error", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse)
    )
)]
pub async fn update_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    origin: RequestOrigin,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "product")?;
    let form = UploadForm::read(multipart?, "images", MAX_GALLERY_IMAGES).await?;
    if form.files.is_empty() {
        return Err(UploadError::NoImage.into());
    }

    let store = state.store();
    if store
        .get_product(id)
        .await
        .map_err(AppError::query)?
        .is_none()
    {
        return Err(not_found());
    }

    let urls = state
        .uploads()
        .save_all(&form.files)
        .await?
        .iter()
        .map(|file_name| public_url(origin.as_str(), file_name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let product = store
        .set_gallery(id, &urls)
        .await
        .map_err(AppError::query)?
        .ok_or_else(not_found)?;

    tracing::info!(product_id = %product.id, images = urls.len(), "Gallery replaced");
    Ok(Json(product))
}

/// Delete a product.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = StatusMessage),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusMessage>> {
    let id: ProductId = parse_id(&id, "product")?;
    if !state.store().delete_product(id).await? {
        return Err(not_found());
    }
    Ok(StatusMessage::ok("the product is deleted"))
}
