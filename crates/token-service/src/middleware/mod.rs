//! HTTP middleware.
//!
//! - `auth` - bearer-key actor resolution for workspace and admin routes
//! - `http_metrics` - request metrics for every response

pub mod auth;
pub mod http_metrics;

pub use auth::{require_cluster_admin, require_workspace_auth, AuthState};
pub use http_metrics::http_metrics_middleware;
