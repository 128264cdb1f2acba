//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Server is running", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{get, send, test_app};

    #[tokio::test]
    async fn test_liveness() {
        let app = test_app();
        let response = tower::ServiceExt::oneshot(app.router.clone(), get("/health"))
            .await
            .map(|r| r.status());
        assert_eq!(response.ok(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_readiness_follows_store() {
        let app = test_app();
        let (status, _) = send(&app.router, get("/health/ready")).await;
        assert_eq!(status, StatusCode::OK);

        app.store.fail_with(true);
        let (status, _) = send(&app.router, get("/health/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
