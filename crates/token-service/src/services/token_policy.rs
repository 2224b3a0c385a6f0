//! Authorization rules for token operations.
//!
//! Every privileged decision funnels through [`Actor::is_cluster_admin`] and
//! [`TokenType::requires_cluster_admin`], so the set of protected token types
//! is defined in exactly one `match`.
//!
//! Workspace-scope access (may this actor touch this workspace at all?) is
//! decided earlier by the auth middleware. The rules here only discriminate
//! by token type within an already-authorized workspace.

use crate::errors::TokenError;
use crate::models::{Actor, Token, TokenType};
use crate::observability::metrics::record_policy_denial;
use std::fmt;
use tracing::warn;

/// Mutating operations on an existing token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    Toggle,
    Delete,
}

impl TokenAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAction::Toggle => "toggle",
            TokenAction::Delete => "delete",
        }
    }
}

impl fmt::Display for TokenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn describe(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::ClusterAdmin => "admin",
        TokenType::WorkspacePrimary => "primary",
        TokenType::Workspace => "workspace",
    }
}

/// Require that the actor holds cluster-admin privilege.
pub fn require_cluster_admin(actor: &Actor) -> Result<(), TokenError> {
    if actor.is_cluster_admin() {
        return Ok(());
    }

    warn!(
        target: "token.services.policy",
        actor_token_id = %actor.token.external_id,
        actor_token_type = %actor.token.token_type,
        "Cluster admin privileges required"
    );
    record_policy_denial("cluster_admin", "not_cluster_admin");
    Err(TokenError::ForbiddenOperation(
        "Cluster admin privileges required".to_string(),
    ))
}

/// Decide whether the actor may mint a token of `requested` type.
///
/// Protected types can only be minted by a cluster admin; anything else is
/// reported as an invalid token type so tenants cannot probe which types exist.
pub fn authorize_create(actor: &Actor, requested: TokenType) -> Result<(), TokenError> {
    if !requested.requires_cluster_admin() || actor.is_cluster_admin() {
        return Ok(());
    }

    warn!(
        target: "token.services.policy",
        actor_token_id = %actor.token.external_id,
        actor_token_type = %actor.token.token_type,
        requested_type = %requested,
        "Rejected creation of protected token type"
    );
    record_policy_denial("create", "protected_type");
    Err(TokenError::InvalidTokenType(requested.as_str().to_string()))
}

/// Decide whether the actor may toggle or delete `target`.
pub fn authorize_mutation(
    actor: &Actor,
    target: &Token,
    action: TokenAction,
) -> Result<(), TokenError> {
    if !target.token_type.requires_cluster_admin() || actor.is_cluster_admin() {
        return Ok(());
    }

    warn!(
        target: "token.services.policy",
        actor_token_id = %actor.token.external_id,
        actor_token_type = %actor.token.token_type,
        target_token_id = %target.external_id,
        target_token_type = %target.token_type,
        action = %action,
        "Rejected mutation of protected token"
    );
    record_policy_denial(action.as_str(), "protected_token");
    Err(TokenError::ForbiddenOperation(format!(
        "Cannot {} {} token",
        action,
        describe(target.token_type)
    )))
}
