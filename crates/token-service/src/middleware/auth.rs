//! Bearer-key authentication for token routes.
//!
//! Both middlewares resolve the presented key to an [`Actor`] and insert it
//! into request extensions. They must be attached with `route_layer` so the
//! `:workspace_id` path parameter is available.

use crate::errors::TokenError;
use crate::models::Actor;
use crate::repositories::TokenRepository;
use crate::services::token_policy;
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub repo: Arc<dyn TokenRepository>,
}

/// Extract Bearer token from the Authorization header.
fn extract_bearer_token(req: &Request) -> Result<&str, TokenError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "token.middleware.auth", "Missing Authorization header");
            TokenError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "token.middleware.auth", "Invalid Authorization header format");
        TokenError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Look up the actor owning `key`. The key is owned so the returned future
/// does not borrow the request.
async fn resolve_actor(state: &AuthState, key: String) -> Result<Actor, TokenError> {
    state.repo.get_actor_by_token_key(&key).await?.ok_or_else(|| {
        tracing::debug!(target: "token.middleware.auth", "Unknown or disabled token key");
        TokenError::InvalidToken("Invalid or disabled token".to_string())
    })
}

/// Authentication for workspace-scoped routes.
///
/// # Response
///
/// - 401 if the key is missing, unknown or disabled
/// - 403 if the actor belongs to another workspace and is not a cluster admin
/// - Otherwise continues with the `Actor` in extensions
#[instrument(skip_all, name = "token.middleware.workspace_auth")]
pub async fn require_workspace_auth(
    State(state): State<Arc<AuthState>>,
    Path(params): Path<HashMap<String, String>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, TokenError> {
    let key = extract_bearer_token(&req)?.to_string();
    let actor = resolve_actor(&state, key).await?;

    let workspace_id = params
        .get("workspace_id")
        .map(String::as_str)
        .unwrap_or_default();

    if !actor.can_access_workspace(workspace_id) {
        tracing::warn!(
            target: "token.middleware.auth",
            actor_token_id = %actor.token.external_id,
            actor_workspace = %actor.workspace_external_id,
            requested_workspace = %workspace_id,
            "Cross-workspace access rejected"
        );
        return Err(TokenError::ForbiddenOperation(
            "Token does not grant access to this workspace".to_string(),
        ));
    }

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}

/// Authentication for cluster-admin routes.
#[instrument(skip_all, name = "token.middleware.cluster_admin_auth")]
pub async fn require_cluster_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, TokenError> {
    let key = extract_bearer_token(&req)?.to_string();
    let actor = resolve_actor(&state, key).await?;
    token_policy::require_cluster_admin(&actor)?;

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
