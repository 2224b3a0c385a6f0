//! HTTP request handlers.

pub mod health;
pub mod metrics;
pub mod token_handler;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use token_handler::{
    handle_cluster_admin_update, handle_create_token, handle_delete_token,
    handle_get_signing_key, handle_list_tokens, handle_toggle_token,
};
