use crate::errors::TokenError;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Token type enum
///
/// Privilege checks match on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// Cross-tenant platform operator credential.
    #[serde(rename = "admin")]
    ClusterAdmin,
    /// Root credential of a workspace (at most one per workspace).
    #[serde(rename = "workspace_primary")]
    WorkspacePrimary,
    /// Ordinary workspace credential.
    #[serde(rename = "workspace")]
    Workspace,
}

impl TokenType {
    /// Convert to the stored/wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::ClusterAdmin => "admin",
            TokenType::WorkspacePrimary => "workspace_primary",
            TokenType::Workspace => "workspace",
        }
    }

    /// Whether this type carries cluster-admin privilege.
    pub fn is_cluster_admin(&self) -> bool {
        matches!(self, TokenType::ClusterAdmin)
    }

    /// Whether minting, toggling or deleting a token of this type requires a
    /// cluster-admin actor.
    pub fn requires_cluster_admin(&self) -> bool {
        match self {
            TokenType::ClusterAdmin | TokenType::WorkspacePrimary => true,
            TokenType::Workspace => false,
        }
    }

    /// Parse the optional `token_type` request parameter.
    ///
    /// A missing or empty value means `Workspace`.
    pub fn from_request(requested: Option<&str>) -> Result<Self, TokenError> {
        match requested.map(str::trim) {
            None | Some("") => Ok(TokenType::Workspace),
            Some(value) => TokenType::from_str(value),
        }
    }
}

impl FromStr for TokenType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(TokenType::ClusterAdmin),
            "workspace_primary" => Ok(TokenType::WorkspacePrimary),
            "workspace" => Ok(TokenType::Workspace),
            _ => Err(TokenError::InvalidTokenType(s.to_string())),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workspace model (maps to workspaces table)
///
/// `signing_key` is only populated by the dedicated signing-key lookup.
#[derive(Debug)]
pub struct Workspace {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub signing_key: Option<SecretString>,
}

/// Raw workspaces row
#[derive(Debug, Clone, FromRow)]
pub struct WorkspaceRow {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub signing_key: Option<String>,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Workspace {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            signing_key: row.signing_key.map(SecretString::from),
        }
    }
}

/// Token model (maps to tokens table)
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub id: i64,
    pub external_id: String,
    pub key: String,
    pub workspace_id: i64,
    pub token_type: TokenType,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key is redacted so tokens can be logged with `{:?}`.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("external_id", &self.external_id)
            .field("key", &"[REDACTED]")
            .field("workspace_id", &self.workspace_id)
            .field("token_type", &self.token_type)
            .field("enabled", &self.enabled)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Raw tokens row; `token_type` is validated on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub id: i64,
    pub external_id: String,
    pub key: String,
    pub workspace_id: i64,
    pub token_type: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for Token {
    type Error = TokenError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let token_type = TokenType::from_str(&row.token_type).map_err(|_| {
            TokenError::Database(format!(
                "Unknown token_type '{}' stored for token {}",
                row.token_type, row.external_id
            ))
        })?;

        Ok(Token {
            id: row.id,
            external_id: row.external_id,
            key: row.key,
            workspace_id: row.workspace_id,
            token_type,
            enabled: !row.disabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Resolved identity of the caller for one request.
///
/// Produced by the auth middleware and passed explicitly into the policy.
#[derive(Debug, Clone)]
pub struct Actor {
    /// The token the caller authenticated with.
    pub token: Token,
    /// External id of the workspace the caller's token belongs to.
    pub workspace_external_id: String,
}

impl Actor {
    /// The single privilege predicate every protected operation goes through.
    pub fn is_cluster_admin(&self) -> bool {
        self.token.token_type.is_cluster_admin()
    }

    /// Whether this actor may act inside the given workspace.
    pub fn can_access_workspace(&self, workspace_external_id: &str) -> bool {
        self.is_cluster_admin() || self.workspace_external_id == workspace_external_id
    }
}

/// Token response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_id: String,
    pub key: String,
    pub token_type: TokenType,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        TokenResponse {
            token_id: token.external_id,
            key: token.key,
            token_type: token.token_type,
            enabled: token.enabled,
            created_at: token.created_at,
            updated_at: token.updated_at,
        }
    }
}

/// Query parameters for token creation
#[derive(Debug, Default, Deserialize)]
pub struct CreateTokenQuery {
    pub token_type: Option<String>,
}

/// Request body for the cluster-admin bulk update
#[derive(Debug, Deserialize)]
pub struct ClusterAdminUpdateRequest {
    pub disabled: bool,
}

/// Signing key disclosure response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningKeyResponse {
    pub signing_key: String,
}

/// Acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        OkResponse { ok: true }
    }
}

/// Readiness probe response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
