//! Workspace resolution.
//!
//! Turns the public workspace id from a request path into a [`Workspace`],
//! mapping a miss to `InvalidWorkspace`.

use crate::errors::TokenError;
use crate::models::Workspace;
use crate::repositories::TokenRepository;
use tracing::debug;

/// Resolve a workspace without its signing key.
pub async fn resolve_workspace(
    repo: &dyn TokenRepository,
    external_id: &str,
) -> Result<Workspace, TokenError> {
    repo.get_workspace_by_external_id(external_id)
        .await?
        .ok_or_else(|| {
            debug!(target: "token.services.workspace", workspace_id = %external_id, "Workspace not found");
            TokenError::InvalidWorkspace
        })
}

/// Resolve a workspace including its signing key.
pub async fn resolve_workspace_with_signing_key(
    repo: &dyn TokenRepository,
    external_id: &str,
) -> Result<Workspace, TokenError> {
    repo.get_workspace_by_external_id_with_signing_key(external_id)
        .await?
        .ok_or_else(|| {
            debug!(target: "token.services.workspace", workspace_id = %external_id, "Workspace not found");
            TokenError::InvalidWorkspace
        })
}
