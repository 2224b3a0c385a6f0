//! Fault-injecting repository wrapper.
//!
//! Wraps any [`TokenRepository`] and fails selected operations on demand.
//! Clones share the same fault switches, so a test can flip faults on a
//! server that is already running.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use token_service::errors::TokenError;
use token_service::models::{Actor, Token, TokenType, Workspace};
use token_service::repositories::TokenRepository;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct FaultyRepository {
    inner: Arc<dyn TokenRepository>,
    failing_updates: Arc<RwLock<HashSet<String>>>,
    store_down: Arc<AtomicBool>,
}

impl FaultyRepository {
    pub fn new(inner: Arc<dyn TokenRepository>) -> Self {
        Self {
            inner,
            failing_updates: Arc::new(RwLock::new(HashSet::new())),
            store_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make `update_token_as_cluster_admin` fail for this token id.
    pub async fn fail_cluster_admin_update(&self, token_id: &str) {
        self.failing_updates
            .write()
            .await
            .insert(token_id.to_string());
    }

    /// Make `ping` fail, simulating an unreachable store.
    pub fn set_store_down(&self, down: bool) {
        self.store_down.store(down, Ordering::SeqCst);
    }

    /// Remove every injected fault.
    pub async fn clear(&self) {
        self.failing_updates.write().await.clear();
        self.set_store_down(false);
    }
}

#[async_trait]
impl TokenRepository for FaultyRepository {
    async fn get_workspace_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError> {
        self.inner.get_workspace_by_external_id(external_id).await
    }

    async fn get_workspace_by_external_id_with_signing_key(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError> {
        self.inner
            .get_workspace_by_external_id_with_signing_key(external_id)
            .await
    }

    async fn create_token(
        &self,
        workspace_id: i64,
        token_type: TokenType,
        enabled: bool,
    ) -> Result<Token, TokenError> {
        self.inner.create_token(workspace_id, token_type, enabled).await
    }

    async fn list_tokens(&self, workspace_id: i64) -> Result<Vec<Token>, TokenError> {
        self.inner.list_tokens(workspace_id).await
    }

    async fn get_token_by_external_id(
        &self,
        workspace_id: i64,
        token_id: &str,
    ) -> Result<Option<Token>, TokenError> {
        self.inner
            .get_token_by_external_id(workspace_id, token_id)
            .await
    }

    async fn toggle_token(&self, workspace_id: i64, token_id: &str) -> Result<Token, TokenError> {
        self.inner.toggle_token(workspace_id, token_id).await
    }

    async fn delete_token(&self, workspace_id: i64, token_id: &str) -> Result<(), TokenError> {
        self.inner.delete_token(workspace_id, token_id).await
    }

    async fn update_token_as_cluster_admin(
        &self,
        token_id: &str,
        disabled: bool,
    ) -> Result<(), TokenError> {
        if self.failing_updates.read().await.contains(token_id) {
            return Err(TokenError::Database(format!(
                "injected failure updating token {}",
                token_id
            )));
        }
        self.inner
            .update_token_as_cluster_admin(token_id, disabled)
            .await
    }

    async fn get_actor_by_token_key(&self, key: &str) -> Result<Option<Actor>, TokenError> {
        self.inner.get_actor_by_token_key(key).await
    }

    async fn ping(&self) -> Result<(), TokenError> {
        if self.store_down.load(Ordering::SeqCst) {
            return Err(TokenError::Database("injected store outage".to_string()));
        }
        self.inner.ping().await
    }
}
