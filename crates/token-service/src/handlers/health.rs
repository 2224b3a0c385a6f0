//! Liveness and readiness probes.

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe. Does not touch the store.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe.
///
/// Returns 503 when the token store cannot be reached. The response carries a
/// generic message; the underlying error is logged.
#[tracing::instrument(skip_all, name = "token.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if let Err(e) = state.repo.ping().await {
        tracing::warn!(target: "token.health", error = %e, "Readiness check failed: store unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                store: Some("unhealthy"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            store: Some("healthy"),
            error: None,
        }),
    )
}
