//! In-memory token repository.
//!
//! Workspaces and tokens live in maps guarded by a single
//! `tokio::sync::RwLock`, so each operation is atomic within the process.
//! Nothing is durable. Used for local runs (`TOKEN_STORE=memory`), the test
//! harness, and unit tests.
//!
//! Workspaces are provisioned outside the token API, so this backend exposes
//! seeding helpers (`insert_workspace`, `insert_token`) that the trait does not.

use crate::crypto;
use crate::errors::TokenError;
use crate::models::{Actor, Token, TokenType, Workspace};
use crate::repositories::TokenRepository;
use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct WorkspaceRecord {
    id: i64,
    external_id: String,
    name: String,
    signing_key: String,
}

impl WorkspaceRecord {
    fn to_workspace(&self, with_signing_key: bool) -> Workspace {
        Workspace {
            id: self.id,
            external_id: self.external_id.clone(),
            name: self.name.clone(),
            signing_key: with_signing_key.then(|| SecretString::from(self.signing_key.clone())),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    next_workspace_id: i64,
    next_token_id: i64,
    workspaces: BTreeMap<i64, WorkspaceRecord>,
    // Keyed by internal id, which is assigned in creation order.
    tokens: BTreeMap<i64, Token>,
}

impl State {
    fn workspace_by_external_id(&self, external_id: &str) -> Option<&WorkspaceRecord> {
        self.workspaces
            .values()
            .find(|ws| ws.external_id == external_id)
    }

    fn token_id_in_workspace(&self, workspace_id: i64, token_id: &str) -> Option<i64> {
        self.tokens
            .values()
            .find(|t| t.workspace_id == workspace_id && t.external_id == token_id)
            .map(|t| t.id)
    }

    fn insert_token(
        &mut self,
        workspace_id: i64,
        token_type: TokenType,
        enabled: bool,
        key: String,
    ) -> Token {
        self.next_token_id += 1;
        let now = Utc::now();
        let token = Token {
            id: self.next_token_id,
            external_id: Uuid::new_v4().to_string(),
            key,
            workspace_id,
            token_type,
            enabled,
            created_at: now,
            updated_at: now,
        };
        self.tokens.insert(token.id, token.clone());
        token
    }
}

/// Process-local token repository.
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a workspace. Returns it without its signing key.
    pub async fn insert_workspace(
        &self,
        external_id: &str,
        name: &str,
        signing_key: &str,
    ) -> Workspace {
        let mut state = self.state.write().await;
        state.next_workspace_id += 1;
        let record = WorkspaceRecord {
            id: state.next_workspace_id,
            external_id: external_id.to_string(),
            name: name.to_string(),
            signing_key: signing_key.to_string(),
        };
        let workspace = record.to_workspace(false);
        state.workspaces.insert(record.id, record);
        workspace
    }

    /// Insert a token with a caller-chosen key (bootstrap and fixtures).
    pub async fn insert_token(
        &self,
        workspace_id: i64,
        token_type: TokenType,
        enabled: bool,
        key: &str,
    ) -> Token {
        let mut state = self.state.write().await;
        state.insert_token(workspace_id, token_type, enabled, key.to_string())
    }

    /// Look a token up by public id across all workspaces.
    pub async fn find_token(&self, token_id: &str) -> Option<Token> {
        let state = self.state.read().await;
        state
            .tokens
            .values()
            .find(|t| t.external_id == token_id)
            .cloned()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn get_workspace_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError> {
        let state = self.state.read().await;
        Ok(state
            .workspace_by_external_id(external_id)
            .map(|ws| ws.to_workspace(false)))
    }

    async fn get_workspace_by_external_id_with_signing_key(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError> {
        let state = self.state.read().await;
        Ok(state
            .workspace_by_external_id(external_id)
            .map(|ws| ws.to_workspace(true)))
    }

    async fn create_token(
        &self,
        workspace_id: i64,
        token_type: TokenType,
        enabled: bool,
    ) -> Result<Token, TokenError> {
        let key = crypto::generate_token_key()?;
        let mut state = self.state.write().await;
        if !state.workspaces.contains_key(&workspace_id) {
            return Err(TokenError::Database(format!(
                "workspace {} does not exist",
                workspace_id
            )));
        }
        Ok(state.insert_token(workspace_id, token_type, enabled, key))
    }

    async fn list_tokens(&self, workspace_id: i64) -> Result<Vec<Token>, TokenError> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .values()
            .filter(|t| t.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn get_token_by_external_id(
        &self,
        workspace_id: i64,
        token_id: &str,
    ) -> Result<Option<Token>, TokenError> {
        let state = self.state.read().await;
        Ok(state
            .token_id_in_workspace(workspace_id, token_id)
            .and_then(|id| state.tokens.get(&id))
            .cloned())
    }

    async fn toggle_token(&self, workspace_id: i64, token_id: &str) -> Result<Token, TokenError> {
        let mut state = self.state.write().await;
        let id = state
            .token_id_in_workspace(workspace_id, token_id)
            .ok_or(TokenError::TokenNotFound)?;
        let token = state.tokens.get_mut(&id).ok_or(TokenError::TokenNotFound)?;
        token.enabled = !token.enabled;
        token.updated_at = Utc::now();
        Ok(token.clone())
    }

    async fn delete_token(&self, workspace_id: i64, token_id: &str) -> Result<(), TokenError> {
        let mut state = self.state.write().await;
        let id = state
            .token_id_in_workspace(workspace_id, token_id)
            .ok_or(TokenError::TokenNotFound)?;
        state.tokens.remove(&id);
        Ok(())
    }

    async fn update_token_as_cluster_admin(
        &self,
        token_id: &str,
        disabled: bool,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write().await;
        let token = state
            .tokens
            .values_mut()
            .find(|t| t.external_id == token_id)
            .ok_or_else(|| {
                TokenError::Database(format!(
                    "Token {} disappeared during cluster admin update",
                    token_id
                ))
            })?;
        token.enabled = !disabled;
        token.updated_at = Utc::now();
        Ok(())
    }

    async fn get_actor_by_token_key(&self, key: &str) -> Result<Option<Actor>, TokenError> {
        let state = self.state.read().await;
        let Some(token) = state.tokens.values().find(|t| t.key == key && t.enabled) else {
            return Ok(None);
        };
        let Some(workspace) = state.workspaces.get(&token.workspace_id) else {
            return Ok(None);
        };
        Ok(Some(Actor {
            token: token.clone(),
            workspace_external_id: workspace.external_id.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), TokenError> {
        Ok(())
    }
}
