//! Observability module for the token service
//!
//! Metrics are recorded through the `metrics` facade and exported in
//! Prometheus format on `/metrics`.
//!
//! # Privacy by Default
//!
//! Instrumentation uses `#[instrument(skip_all)]` and explicit field
//! allow-listing. Workspace and token external ids and token types may be
//! logged. Token keys and workspace signing keys must never appear in logs
//! or metric labels.

pub mod metrics;

pub use metrics::{record_db_query, record_http_request, record_token_operation};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Outcome label for an operation result.
pub fn status_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}
