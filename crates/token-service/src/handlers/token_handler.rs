//! Token management handlers.
//!
//! Each handler resolves the path workspace, then hands the authenticated
//! [`Actor`] to the token service. Authentication and workspace scoping have
//! already been applied by the route middleware.

use crate::errors::TokenError;
use crate::models::{
    Actor, ClusterAdminUpdateRequest, CreateTokenQuery, OkResponse, SigningKeyResponse,
    TokenResponse,
};
use crate::routes::AppState;
use crate::services::{token_service, workspace_service};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Handle token creation
///
/// POST /api/v1/workspaces/:workspace_id/tokens?token_type=
#[instrument(skip_all, name = "token.handler.create", fields(workspace_id = %workspace_id))]
pub async fn handle_create_token(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<CreateTokenQuery>,
) -> Result<Json<TokenResponse>, TokenError> {
    let workspace = workspace_service::resolve_workspace(state.repo.as_ref(), &workspace_id).await?;

    let token = token_service::create_token(
        state.repo.as_ref(),
        &actor,
        &workspace,
        query.token_type.as_deref(),
    )
    .await?;

    Ok(Json(token.into()))
}

/// Handle token listing
///
/// GET /api/v1/workspaces/:workspace_id/tokens
#[instrument(skip_all, name = "token.handler.list", fields(workspace_id = %workspace_id))]
pub async fn handle_list_tokens(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<TokenResponse>>, TokenError> {
    let workspace = workspace_service::resolve_workspace(state.repo.as_ref(), &workspace_id).await?;

    let tokens = token_service::list_tokens(state.repo.as_ref(), &actor, &workspace).await?;

    Ok(Json(tokens.into_iter().map(TokenResponse::from).collect()))
}

/// Handle token enable/disable flip
///
/// POST /api/v1/workspaces/:workspace_id/tokens/:token_id/toggle
#[instrument(skip_all, name = "token.handler.toggle", fields(workspace_id = %workspace_id, token_id = %token_id))]
pub async fn handle_toggle_token(
    State(state): State<Arc<AppState>>,
    Path((workspace_id, token_id)): Path<(String, String)>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<TokenResponse>, TokenError> {
    let workspace = workspace_service::resolve_workspace(state.repo.as_ref(), &workspace_id).await?;

    let token =
        token_service::toggle_token(state.repo.as_ref(), &actor, &workspace, &token_id).await?;

    Ok(Json(token.into()))
}

/// Handle token deletion
///
/// DELETE /api/v1/workspaces/:workspace_id/tokens/:token_id
#[instrument(skip_all, name = "token.handler.delete", fields(workspace_id = %workspace_id, token_id = %token_id))]
pub async fn handle_delete_token(
    State(state): State<Arc<AppState>>,
    Path((workspace_id, token_id)): Path<(String, String)>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<OkResponse>, TokenError> {
    let workspace = workspace_service::resolve_workspace(state.repo.as_ref(), &workspace_id).await?;

    token_service::delete_token(state.repo.as_ref(), &actor, &workspace, &token_id).await?;

    Ok(Json(OkResponse::ok()))
}

/// Handle signing key disclosure
///
/// GET /api/v1/workspaces/:workspace_id/signing-key
#[instrument(skip_all, name = "token.handler.signing_key", fields(workspace_id = %workspace_id))]
pub async fn handle_get_signing_key(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
) -> Result<Json<SigningKeyResponse>, TokenError> {
    let workspace =
        workspace_service::resolve_workspace_with_signing_key(state.repo.as_ref(), &workspace_id)
            .await?;

    let signing_key = token_service::get_signing_key(&workspace)?;

    Ok(Json(SigningKeyResponse {
        signing_key: signing_key.expose_secret().to_string(),
    }))
}

/// Bulk update summary
#[derive(Debug, Serialize)]
pub struct ClusterAdminUpdateResponse {
    pub ok: bool,
    pub updated: usize,
}

/// Handle cluster-admin bulk enable/disable
///
/// PATCH /api/v1/admin/workspaces/:workspace_id/tokens
///
/// The body is decoded by hand so malformed input maps to 400 rather than
/// axum's 422.
/// Decode a bulk update body. Only a JSON object is accepted; serde would
/// otherwise read a one-element array as the struct in sequence form.
fn parse_cluster_admin_update(body: &[u8]) -> Result<ClusterAdminUpdateRequest, TokenError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| TokenError::BadRequest(format!("Invalid request body: {}", e)))?;

    if !value.is_object() {
        return Err(TokenError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| TokenError::BadRequest(format!("Invalid request body: {}", e)))
}

#[instrument(skip_all, name = "token.handler.cluster_admin_update", fields(workspace_id = %workspace_id))]
pub async fn handle_cluster_admin_update(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    body: Bytes,
) -> Result<Json<ClusterAdminUpdateResponse>, TokenError> {
    let request = parse_cluster_admin_update(&body)?;

    let workspace = workspace_service::resolve_workspace(state.repo.as_ref(), &workspace_id).await?;

    let updated =
        token_service::cluster_admin_set_disabled(state.repo.as_ref(), &workspace, request.disabled)
            .await?;

    Ok(Json(ClusterAdminUpdateResponse { ok: true, updated }))
}
