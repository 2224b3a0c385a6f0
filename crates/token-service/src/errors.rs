//! Token service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl.
//! Persistence failures return a generic message to clients; the actual
//! error is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Token service error type.
///
/// Maps to HTTP status codes:
/// - InvalidWorkspace, InvalidTokenType, BadRequest: 400 Bad Request
/// - InvalidToken: 401 Unauthorized
/// - ForbiddenOperation: 403 Forbidden
/// - TokenNotFound: 404 Not Found
/// - Database, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid workspace ID")]
    InvalidWorkspace,

    #[error("Invalid token type: {0}")]
    InvalidTokenType(String),

    #[error("Token not found")]
    TokenNotFound,

    #[error("Forbidden: {0}")]
    ForbiddenOperation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl TokenError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            TokenError::InvalidWorkspace
            | TokenError::InvalidTokenType(_)
            | TokenError::BadRequest(_) => 400,
            TokenError::InvalidToken(_) => 401,
            TokenError::ForbiddenOperation(_) => 403,
            TokenError::TokenNotFound => 404,
            TokenError::Database(_) | TokenError::Internal => 500,
        }
    }

    /// Bounded label used by the error metrics.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::InvalidWorkspace => "invalid_workspace",
            TokenError::InvalidTokenType(_) => "invalid_token_type",
            TokenError::TokenNotFound => "token_not_found",
            TokenError::ForbiddenOperation(_) => "forbidden",
            TokenError::Database(_) => "database",
            TokenError::InvalidToken(_) => "unauthenticated",
            TokenError::BadRequest(_) => "bad_request",
            TokenError::Internal => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            TokenError::InvalidWorkspace => (
                StatusCode::BAD_REQUEST,
                "INVALID_WORKSPACE",
                "Invalid workspace ID".to_string(),
            ),
            TokenError::InvalidTokenType(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_TOKEN_TYPE",
                "Invalid token type".to_string(),
            ),
            TokenError::TokenNotFound => (
                StatusCode::NOT_FOUND,
                "TOKEN_NOT_FOUND",
                "Invalid token ID".to_string(),
            ),
            TokenError::ForbiddenOperation(reason) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", reason.clone())
            }
            TokenError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "token.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            TokenError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            TokenError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            TokenError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"workspace-tokens\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

/// Convert sqlx errors to TokenError
impl From<sqlx::Error> for TokenError {
    fn from(err: sqlx::Error) -> Self {
        TokenError::Database(err.to_string())
    }
}
