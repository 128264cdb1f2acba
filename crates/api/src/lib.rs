//! Catalog API library.
//!
//! This crate provides the HTTP server as a library, allowing the router to
//! be tested without a network listener and reused by the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderValue, Request, Response, header},
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::CatalogConfig;
use crate::services::uploads::UPLOADS_ROUTE;
use crate::state::AppState;

/// Build the full application router.
///
/// Mounts the resource routes, the OpenAPI document and the uploaded images,
/// wrapped in request tracing, request ids and CORS. Sentry layers are added
/// by the binary.
pub fn app(state: AppState) -> Router {
    let doc = Arc::new(openapi::document(&state.config().base_url));
    let cors = cors_layer(state.config());
    let upload_dir = state.config().upload_dir.clone();

    Router::new()
        .merge(routes::routes())
        .route(
            openapi::OPENAPI_PATH,
            get(move || {
                let doc = Arc::clone(&doc);
                async move { ([(header::CACHE_CONTROL, "no-store")], Json(doc.as_ref().clone())) }
            }),
        )
        .nest_service(UPLOADS_ROUTE, ServeDir::new(upload_dir))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origins, or any origin when none are configured.
fn cors_layer(config: &CatalogConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::middleware::REQUEST_ID_HEADER;
    use crate::routes::test_support::{Part, get, multipart, send, test_app};

    #[tokio::test]
    async fn test_uploaded_image_is_served() {
        let app = test_app();
        let (status, product) = send(
            &app.router,
            multipart(
                Method::POST,
                "/products",
                &[
                    Part::Text("name", "Shirt"),
                    Part::Text("description", "d"),
                    Part::Text("price", "10"),
                    Part::Text("stock", "1"),
                    Part::File {
                        field: "image",
                        file_name: "shirt.jpg",
                        content_type: "image/jpeg",
                    },
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{product}");

        let image = product["image"].as_str().unwrap();
        let path = image.split_once("shop.test:3000").unwrap().1;
        assert!(path.ends_with(".jpeg"));

        let response = app.router.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"IMAGEBYTES");
    }

    #[tokio::test]
    async fn test_reserved_characters_in_upload_name_stay_reachable() {
        let app = test_app();
        for file_name in ["shirt #1.png", "100% cotton?.png"] {
            let (status, product) = send(
                &app.router,
                multipart(
                    Method::POST,
                    "/products",
                    &[
                        Part::Text("name", "Shirt"),
                        Part::Text("description", "d"),
                        Part::Text("price", "10"),
                        Part::Text("stock", "1"),
                        Part::File {
                            field: "image",
                            file_name,
                            content_type: "image/png",
                        },
                    ],
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "{product}");

            let image = product["image"].as_str().unwrap();
            assert!(!image.contains('#') && !image.contains('?'), "{image}");
            let path = image.split_once("shop.test:3000").unwrap().1;

            let response = app.router.clone().oneshot(get(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{image}");
        }
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/products")
                    .header("host", "shop.test")
                    .header(REQUEST_ID_HEADER, "req-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-1");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/products")
                    .header("origin", "https://elsewhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
