//! Repository layer for workspaces and tokens.
//!
//! The policy layer only talks to [`TokenRepository`]. Two backends exist:
//! - [`PgTokenRepository`] - PostgreSQL via sqlx (production)
//! - [`InMemoryTokenRepository`] - process-local maps (local runs and tests)
//!
//! Lookups that may legitimately miss return `Ok(None)`; the service layer
//! decides which error kind a miss becomes. Storage failures are
//! `TokenError::Database`.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTokenRepository;
pub use postgres::PgTokenRepository;

use crate::errors::TokenError;
use crate::models::{Actor, Token, TokenType, Workspace};
use async_trait::async_trait;

/// Storage operations consumed by the token policy.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Look up a workspace by its public id. The signing key is not loaded.
    async fn get_workspace_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError>;

    /// Look up a workspace by its public id, including its signing key.
    async fn get_workspace_by_external_id_with_signing_key(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError>;

    /// Persist a new token bound to `workspace_id`.
    async fn create_token(
        &self,
        workspace_id: i64,
        token_type: TokenType,
        enabled: bool,
    ) -> Result<Token, TokenError>;

    /// All tokens of a workspace in creation order.
    async fn list_tokens(&self, workspace_id: i64) -> Result<Vec<Token>, TokenError>;

    /// Look up a token by public id, scoped to `workspace_id`.
    async fn get_token_by_external_id(
        &self,
        workspace_id: i64,
        token_id: &str,
    ) -> Result<Option<Token>, TokenError>;

    /// Flip a token's enabled flag and return the updated token.
    async fn toggle_token(&self, workspace_id: i64, token_id: &str) -> Result<Token, TokenError>;

    /// Remove a token. Returns `TokenNotFound` if no row was removed.
    async fn delete_token(&self, workspace_id: i64, token_id: &str) -> Result<(), TokenError>;

    /// Set a token's disabled state regardless of workspace or type.
    async fn update_token_as_cluster_admin(
        &self,
        token_id: &str,
        disabled: bool,
    ) -> Result<(), TokenError>;

    /// Resolve a presented bearer key to its actor. Disabled tokens do not resolve.
    async fn get_actor_by_token_key(&self, key: &str) -> Result<Option<Actor>, TokenError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), TokenError>;
}
