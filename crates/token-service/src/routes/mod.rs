//! HTTP routing.
//!
//! Route groups:
//! - public: `/health`, `/ready`
//! - metrics: `/metrics` (own state, the Prometheus handle)
//! - workspace: `/api/v1/workspaces/:workspace_id/...`, bearer key scoped to
//!   the path workspace unless the caller is a cluster admin
//! - admin: `/api/v1/admin/...`, cluster admin only

use crate::config::Config;
use crate::handlers;
use crate::middleware::{
    http_metrics_middleware, require_cluster_admin, require_workspace_auth, AuthState,
};
use crate::repositories::TokenRepository;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token store backend.
    pub repo: Arc<dyn TokenRepository>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        repo: state.repo.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let workspace_routes = Router::new()
        .route(
            "/api/v1/workspaces/:workspace_id/tokens",
            post(handlers::handle_create_token).get(handlers::handle_list_tokens),
        )
        .route(
            "/api/v1/workspaces/:workspace_id/tokens/:token_id",
            delete(handlers::handle_delete_token),
        )
        .route(
            "/api/v1/workspaces/:workspace_id/tokens/:token_id/toggle",
            post(handlers::handle_toggle_token),
        )
        .route(
            "/api/v1/workspaces/:workspace_id/signing-key",
            get(handlers::handle_get_signing_key),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_workspace_auth,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/workspaces/:workspace_id/tokens",
            patch(handlers::handle_cluster_admin_update),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            require_cluster_admin,
        ))
        .with_state(state.clone());

    public_routes
        .merge(metrics_routes)
        .merge(workspace_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(middleware::from_fn(http_metrics_middleware))
}
