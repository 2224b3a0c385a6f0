//! Metrics definitions for the token service
//!
//! All metrics follow Prometheus naming conventions:
//! - `token_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `operation`: the six token operations plus auth
//! - `status`: 2 values (success, error)
//! - `reason`: bounded by `TokenError::category`
//! - `table`: 2 values (workspaces, tokens)
//! - `endpoint`: normalized paths, ids replaced by `{id}`

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Token Operation Metrics
// ============================================================================

/// Record a token lifecycle operation
///
/// Metric: `token_operation_duration_seconds`, `token_operations_total`
/// Labels: `operation`, `status`
pub fn record_token_operation(operation: &str, status: &str, duration: Duration) {
    histogram!("token_operation_duration_seconds", "operation" => operation.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("token_operations_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record a policy denial
///
/// Metric: `token_policy_denials_total`
/// Labels: `operation`, `reason`
pub fn record_policy_denial(operation: &str, reason: &str) {
    counter!("token_policy_denials_total", "operation" => operation.to_string(), "reason" => reason.to_string())
        .increment(1);
}

/// Record tokens touched by a cluster-admin bulk update
///
/// Metric: `token_bulk_updates_total`
/// Labels: `status`
pub fn record_bulk_update(status: &str, tokens_updated: usize) {
    counter!("token_bulk_updates_total", "status" => status.to_string()).increment(1);
    counter!("token_bulk_updated_tokens_total").increment(tokens_updated as u64);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `token_db_query_duration_seconds`, `token_db_queries_total`
/// Labels: `operation`, `table`, `status`
pub fn record_db_query(operation: &str, table: &str, status: &str, duration: Duration) {
    histogram!("token_db_query_duration_seconds", "operation" => operation.to_string(), "table" => table.to_string())
        .record(duration.as_secs_f64());

    counter!("token_db_queries_total", "operation" => operation.to_string(), "table" => table.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request
///
/// Metric: `token_http_request_duration_seconds`, `token_http_requests_total`
/// Labels: `method`, `endpoint`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = normalize_endpoint(path);

    histogram!("token_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint.clone()
    )
    .record(duration.as_secs_f64());

    counter!("token_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `token_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("token_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Collapse path ids into `{id}` so the label stays bounded.
///
/// Segments following `workspaces` and `tokens` are ids; everything else is
/// a fixed route segment. Unknown paths collapse to `other`.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/health" | "/ready" | "/metrics" => return path.to_string(),
        _ => {}
    }

    if !path.starts_with("/api/v1/") {
        return "other".to_string();
    }

    let mut normalized = Vec::new();
    let mut previous = "";
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if previous == "workspaces" || previous == "tokens" {
            normalized.push("{id}");
        } else {
            normalized.push(segment);
        }
        previous = segment;
    }

    format!("/{}", normalized.join("/"))
}
