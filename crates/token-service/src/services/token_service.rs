//! Token lifecycle operations.
//!
//! Each operation takes the repository, the resolved [`Actor`] and the
//! target [`Workspace`] explicitly; nothing here keeps state between calls.
//! Authorization rules live in [`token_policy`].

use crate::errors::TokenError;
use crate::models::{Actor, Token, TokenType, Workspace};
use crate::observability::metrics::{record_bulk_update, record_error, record_token_operation};
use crate::observability::status_label;
use crate::repositories::TokenRepository;
use crate::services::token_policy::{self, TokenAction};
use secrecy::SecretString;
use std::time::Instant;
use tracing::{info, instrument, warn};

fn finish<T>(operation: &str, result: &Result<T, TokenError>, start: Instant) {
    record_token_operation(operation, status_label(result), start.elapsed());
    if let Err(e) = result {
        record_error(operation, e.category(), e.status_code());
    }
}

/// Issue a new token in `workspace`.
///
/// `requested_type` of `None` or `""` means an ordinary workspace token.
/// Protected types are only issued to cluster admins.
#[instrument(
    skip_all,
    name = "token.service.create",
    fields(workspace_id = %workspace.external_id)
)]
pub async fn create_token(
    repo: &dyn TokenRepository,
    actor: &Actor,
    workspace: &Workspace,
    requested_type: Option<&str>,
) -> Result<Token, TokenError> {
    let start = Instant::now();
    let result = async {
        let token_type = TokenType::from_request(requested_type)?;
        token_policy::authorize_create(actor, token_type)?;

        let token = repo.create_token(workspace.id, token_type, true).await?;

        info!(
            target: "token.services.token",
            workspace_id = %workspace.external_id,
            token_id = %token.external_id,
            token_type = %token.token_type,
            actor_token_id = %actor.token.external_id,
            "Token created"
        );
        Ok::<_, TokenError>(token)
    }
    .await;
    finish("create", &result, start);
    result
}

/// All tokens belonging to `workspace`, in creation order.
#[instrument(
    skip_all,
    name = "token.service.list",
    fields(workspace_id = %workspace.external_id)
)]
pub async fn list_tokens(
    repo: &dyn TokenRepository,
    _actor: &Actor,
    workspace: &Workspace,
) -> Result<Vec<Token>, TokenError> {
    let start = Instant::now();
    let result = repo.list_tokens(workspace.id).await;
    finish("list", &result, start);
    result
}

/// Resolve `token_id` inside `workspace` and check the actor may mutate it.
async fn load_mutable_token(
    repo: &dyn TokenRepository,
    actor: &Actor,
    workspace: &Workspace,
    token_id: &str,
    action: TokenAction,
) -> Result<Token, TokenError> {
    let token = repo
        .get_token_by_external_id(workspace.id, token_id)
        .await?
        .ok_or(TokenError::TokenNotFound)?;

    token_policy::authorize_mutation(actor, &token, action)?;
    Ok(token)
}

/// Flip a token's enabled flag and return the updated token.
#[instrument(
    skip_all,
    name = "token.service.toggle",
    fields(workspace_id = %workspace.external_id, token_id = %token_id)
)]
pub async fn toggle_token(
    repo: &dyn TokenRepository,
    actor: &Actor,
    workspace: &Workspace,
    token_id: &str,
) -> Result<Token, TokenError> {
    let start = Instant::now();
    let result = async {
        load_mutable_token(repo, actor, workspace, token_id, TokenAction::Toggle).await?;
        let token = repo.toggle_token(workspace.id, token_id).await?;

        info!(
            target: "token.services.token",
            workspace_id = %workspace.external_id,
            token_id = %token.external_id,
            enabled = token.enabled,
            actor_token_id = %actor.token.external_id,
            "Token toggled"
        );
        Ok::<_, TokenError>(token)
    }
    .await;
    finish("toggle", &result, start);
    result
}

/// Delete a token.
///
/// Deleting a token that does not exist (or belongs to another workspace)
/// is `TokenNotFound`, not a silent success.
#[instrument(
    skip_all,
    name = "token.service.delete",
    fields(workspace_id = %workspace.external_id, token_id = %token_id)
)]
pub async fn delete_token(
    repo: &dyn TokenRepository,
    actor: &Actor,
    workspace: &Workspace,
    token_id: &str,
) -> Result<(), TokenError> {
    let start = Instant::now();
    let result = async {
        load_mutable_token(repo, actor, workspace, token_id, TokenAction::Delete).await?;
        repo.delete_token(workspace.id, token_id).await?;

        info!(
            target: "token.services.token",
            workspace_id = %workspace.external_id,
            token_id = %token_id,
            actor_token_id = %actor.token.external_id,
            "Token deleted"
        );
        Ok::<_, TokenError>(())
    }
    .await;
    finish("delete", &result, start);
    result
}

/// Set the disabled state of every token in `workspace`.
///
/// Cluster-admin privilege is checked at the routing boundary, not here.
/// Tokens are updated one at a time in listing order. The first failure
/// aborts the batch; tokens updated before it stay updated. Returns the
/// number of tokens updated.
#[instrument(
    skip_all,
    name = "token.service.cluster_admin_update",
    fields(workspace_id = %workspace.external_id, disabled = disabled)
)]
pub async fn cluster_admin_set_disabled(
    repo: &dyn TokenRepository,
    workspace: &Workspace,
    disabled: bool,
) -> Result<usize, TokenError> {
    let start = Instant::now();
    let tokens = repo.list_tokens(workspace.id).await;
    let result = match tokens {
        Ok(tokens) => {
            let mut updated = 0;
            let mut outcome = Ok(());
            for token in &tokens {
                if let Err(e) = repo
                    .update_token_as_cluster_admin(&token.external_id, disabled)
                    .await
                {
                    warn!(
                        target: "token.services.token",
                        workspace_id = %workspace.external_id,
                        token_id = %token.external_id,
                        updated = updated,
                        remaining = tokens.len() - updated,
                        error = %e,
                        "Cluster admin update aborted"
                    );
                    outcome = Err(e);
                    break;
                }
                updated += 1;
            }
            record_bulk_update(status_label(&outcome), updated);
            outcome.map(|()| updated)
        }
        Err(e) => Err(e),
    };

    if let Ok(updated) = &result {
        info!(
            target: "token.services.token",
            workspace_id = %workspace.external_id,
            disabled = disabled,
            updated = *updated,
            "Cluster admin updated workspace tokens"
        );
    }
    finish("cluster_admin_update", &result, start);
    result
}

/// The workspace's signing key, verbatim.
///
/// `workspace` must come from the signing-key lookup; callers are authorized
/// upstream.
#[instrument(
    skip_all,
    name = "token.service.signing_key",
    fields(workspace_id = %workspace.external_id)
)]
pub fn get_signing_key(workspace: &Workspace) -> Result<&SecretString, TokenError> {
    let start = Instant::now();
    let result = workspace.signing_key.as_ref().ok_or_else(|| {
        tracing::error!(
            target: "token.services.token",
            workspace_id = %workspace.external_id,
            "Workspace was loaded without its signing key"
        );
        TokenError::Internal
    });
    finish("signing_key", &result, start);
    result
}
