use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use super::tmdb::TmdbError;

#[derive(Debug, ThisError)]
pub enum ViewVaultError {
    #[error("Vault not found: {0}")]
    VaultNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Item with external id {0} already in vault")]
    ItemExists(u64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Tmdb(#[from] TmdbError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl ViewVaultError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ViewVaultError::InvalidRequest(message.into())
    }
}

impl IntoResponse for ViewVaultError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            ViewVaultError::DatabaseError(_)
            | ViewVaultError::RactorError(_)
            | ViewVaultError::JsonError(_) => {
                tracing::error!(error = %self, "internal error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (status, body)
            }

            ViewVaultError::VaultNotFound(_) | ViewVaultError::ItemNotFound(_) => {
                let body = ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: self.to_string(),
                    details: None,
                };
                (StatusCode::NOT_FOUND, body)
            }

            ViewVaultError::ItemExists(_) => {
                let body = ApiErrorObject {
                    code: "ALREADY_EXISTS".to_string(),
                    message: self.to_string(),
                    details: None,
                };
                (StatusCode::CONFLICT, body)
            }

            ViewVaultError::InvalidRequest(message) => {
                let body = ApiErrorObject {
                    code: "INVALID_REQUEST".to_string(),
                    message,
                    details: None,
                };
                (StatusCode::BAD_REQUEST, body)
            }

            ViewVaultError::Tmdb(TmdbError::Upstream { status, message }) => {
                tracing::warn!(status = %status, message = %message, "TMDB upstream error");
                let (status, code, msg) = match status {
                    StatusCode::NOT_FOUND => (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        "Metadata not found upstream.",
                    ),
                    StatusCode::TOO_MANY_REQUESTS => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "RATE_LIMIT",
                        "Upstream rate limit exceeded.",
                    ),
                    _ => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "An upstream error occurred.",
                    ),
                };
                let body = ApiErrorObject {
                    code: code.to_string(),
                    message: msg.to_string(),
                    details: Some(Value::String(message)),
                };
                (status, body)
            }

            ViewVaultError::Tmdb(e) => {
                tracing::warn!(error = %e, "TMDB call failed");
                let body = ApiErrorObject {
                    code: "UPSTREAM_ERROR".to_string(),
                    message: "Upstream service error.".to_string(),
                    details: None,
                };
                (StatusCode::BAD_GATEWAY, body)
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
