//! PostgreSQL token repository.
//!
//! All queries are parameterized and timed through `record_db_query`.
//! Single-row updates rely on Postgres row atomicity; there is no
//! cross-statement transaction (last write wins on concurrent toggles).

use crate::crypto;
use crate::errors::TokenError;
use crate::models::{Actor, Token, TokenRow, TokenType, Workspace, WorkspaceRow};
use crate::observability::{record_db_query, status_label};
use crate::repositories::TokenRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

const TOKEN_COLUMNS: &str = r#"
    id, external_id, key, workspace_id, token_type, disabled, created_at, updated_at
"#;

/// Token repository backed by a Postgres connection pool.
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct ActorRow {
    #[sqlx(flatten)]
    token: TokenRow,
    workspace_external_id: String,
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    #[instrument(skip_all, name = "token.repo.get_workspace")]
    async fn get_workspace_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, external_id, name, NULL::TEXT AS signing_key
            FROM workspaces
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await;
        record_db_query("select", "workspaces", status_label(&result), start.elapsed());

        let row = result
            .map_err(|e| TokenError::Database(format!("Failed to fetch workspace: {}", e)))?;

        Ok(row.map(Workspace::from))
    }

    #[instrument(skip_all, name = "token.repo.get_workspace_with_signing_key")]
    async fn get_workspace_by_external_id_with_signing_key(
        &self,
        external_id: &str,
    ) -> Result<Option<Workspace>, TokenError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, external_id, name, signing_key
            FROM workspaces
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await;
        record_db_query("select", "workspaces", status_label(&result), start.elapsed());

        let row = result.map_err(|e| {
            TokenError::Database(format!("Failed to fetch workspace signing key: {}", e))
        })?;

        Ok(row.map(Workspace::from))
    }

    #[instrument(skip_all, name = "token.repo.create_token")]
    async fn create_token(
        &self,
        workspace_id: i64,
        token_type: TokenType,
        enabled: bool,
    ) -> Result<Token, TokenError> {
        let external_id = Uuid::new_v4().to_string();
        let key = crypto::generate_token_key()?;

        let start = Instant::now();
        let result = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
            INSERT INTO tokens (external_id, key, workspace_id, token_type, disabled)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TOKEN_COLUMNS
        ))
        .bind(&external_id)
        .bind(&key)
        .bind(workspace_id)
        .bind(token_type.as_str())
        .bind(!enabled)
        .fetch_one(&self.pool)
        .await;
        record_db_query("insert", "tokens", status_label(&result), start.elapsed());

        let row =
            result.map_err(|e| TokenError::Database(format!("Failed to create token: {}", e)))?;

        Token::try_from(row)
    }

    #[instrument(skip_all, name = "token.repo.list_tokens")]
    async fn list_tokens(&self, workspace_id: i64) -> Result<Vec<Token>, TokenError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
            SELECT {}
            FROM tokens
            WHERE workspace_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
            TOKEN_COLUMNS
        ))
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await;
        record_db_query("select", "tokens", status_label(&result), start.elapsed());

        let rows =
            result.map_err(|e| TokenError::Database(format!("Failed to list tokens: {}", e)))?;

        rows.into_iter().map(Token::try_from).collect()
    }

    #[instrument(skip_all, name = "token.repo.get_token")]
    async fn get_token_by_external_id(
        &self,
        workspace_id: i64,
        token_id: &str,
    ) -> Result<Option<Token>, TokenError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
            SELECT {}
            FROM tokens
            WHERE workspace_id = $1 AND external_id = $2
            "#,
            TOKEN_COLUMNS
        ))
        .bind(workspace_id)
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await;
        record_db_query("select", "tokens", status_label(&result), start.elapsed());

        let row =
            result.map_err(|e| TokenError::Database(format!("Failed to fetch token: {}", e)))?;

        row.map(Token::try_from).transpose()
    }

    #[instrument(skip_all, name = "token.repo.toggle_token")]
    async fn toggle_token(&self, workspace_id: i64, token_id: &str) -> Result<Token, TokenError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
            UPDATE tokens
            SET disabled = NOT disabled, updated_at = NOW()
            WHERE workspace_id = $1 AND external_id = $2
            RETURNING {}
            "#,
            TOKEN_COLUMNS
        ))
        .bind(workspace_id)
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await;
        record_db_query("update", "tokens", status_label(&result), start.elapsed());

        let row =
            result.map_err(|e| TokenError::Database(format!("Failed to toggle token: {}", e)))?;

        // Row vanished between lookup and update (concurrent delete)
        let row = row.ok_or(TokenError::TokenNotFound)?;
        Token::try_from(row)
    }

    #[instrument(skip_all, name = "token.repo.delete_token")]
    async fn delete_token(&self, workspace_id: i64, token_id: &str) -> Result<(), TokenError> {
        let start = Instant::now();
        let result = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE workspace_id = $1 AND external_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(token_id)
        .execute(&self.pool)
        .await;
        record_db_query("delete", "tokens", status_label(&result), start.elapsed());

        let done =
            result.map_err(|e| TokenError::Database(format!("Failed to delete token: {}", e)))?;

        if done.rows_affected() == 0 {
            return Err(TokenError::TokenNotFound);
        }

        Ok(())
    }

    #[instrument(skip_all, name = "token.repo.update_token_as_cluster_admin")]
    async fn update_token_as_cluster_admin(
        &self,
        token_id: &str,
        disabled: bool,
    ) -> Result<(), TokenError> {
        let start = Instant::now();
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET disabled = $2, updated_at = NOW()
            WHERE external_id = $1
            "#,
        )
        .bind(token_id)
        .bind(disabled)
        .execute(&self.pool)
        .await;
        record_db_query("update", "tokens", status_label(&result), start.elapsed());

        let done =
            result.map_err(|e| TokenError::Database(format!("Failed to update token: {}", e)))?;

        if done.rows_affected() == 0 {
            return Err(TokenError::Database(format!(
                "Token {} disappeared during cluster admin update",
                token_id
            )));
        }

        Ok(())
    }

    #[instrument(skip_all, name = "token.repo.get_actor")]
    async fn get_actor_by_token_key(&self, key: &str) -> Result<Option<Actor>, TokenError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT
                t.id, t.external_id, t.key, t.workspace_id, t.token_type, t.disabled,
                t.created_at, t.updated_at,
                w.external_id AS workspace_external_id
            FROM tokens t
            JOIN workspaces w ON w.id = t.workspace_id
            WHERE t.key = $1 AND t.disabled = false
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        record_db_query("select", "tokens", status_label(&result), start.elapsed());

        let row = result
            .map_err(|e| TokenError::Database(format!("Failed to resolve token key: {}", e)))?;

        match row {
            Some(row) => Ok(Some(Actor {
                token: Token::try_from(row.token)?,
                workspace_external_id: row.workspace_external_id,
            })),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), TokenError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
