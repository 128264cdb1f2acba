//! Integration tests for the catalog API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the server against a scratch database
//! catalog-cli migrate
//! cargo run -p catalog-api
//!
//! # Run the ignored tests against it
//! CATALOG_TEST_URL=http://127.0.0.1:3000 cargo test -p catalog-integration-tests -- --ignored
//! ```
//!
//! Every test creates its own records and removes them afterwards, but
//! list assertions only check for presence, so a shared database is fine.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

/// Base URL for the API under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CATALOG_TEST_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Client plus base URL for one test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A product form with every required field and a small PNG image.
    #[must_use]
    pub fn product_form(name: &str, price: &str, stock: &str) -> Form {
        Form::new()
            .text("name", name.to_string())
            .text("description", "integration test product")
            .text("price", price.to_string())
            .text("stock", stock.to_string())
            .part("image", png_part("product image.png"))
    }

    /// Create a product and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the server does not answer 200.
    pub async fn create_product(&self, name: &str, price: &str) -> Value {
        let response = self
            .client
            .post(self.url("/products"))
            .multipart(Self::product_form(name, price, "5"))
            .send()
            .await
            .expect("Failed to create product");
        expect_json(response, StatusCode::OK).await
    }

    /// Create a user and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the server does not answer 200.
    pub async fn create_user(&self, name: &str) -> Value {
        let email = format!("{}@example.com", uuid::Uuid::new_v4().simple());
        let response = self
            .client
            .post(self.url("/users"))
            .json(&serde_json::json!({"name": name, "email": email, "password": "secret"}))
            .send()
            .await
            .expect("Failed to create user");
        expect_json(response, StatusCode::OK).await
    }

    /// Best-effort delete used for cleanup.
    pub async fn delete(&self, path: &str) {
        let _ = self.client.delete(self.url(path)).send().await;
    }
}

/// A tiny PNG file part.
///
/// # Panics
///
/// Panics if the hard-coded MIME type is rejected by reqwest.
#[must_use]
pub fn png_part(file_name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\n".to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("valid MIME type")
}

/// Assert the status and parse the body as JSON.
///
/// # Panics
///
/// Panics if the status differs or the body is not JSON.
pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let body = response.text().await.expect("Failed to read response");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    serde_json::from_str(&body).expect("Response is not JSON")
}

/// Pull the string `id` out of a JSON record.
///
/// # Panics
///
/// Panics if the record has no string `id`.
#[must_use]
pub fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("record has an id").to_string()
}
