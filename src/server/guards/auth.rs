use crate::server::router::ViewVaultState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use subtle::ConstantTimeEq;

const API_KEY_HEADER: &str = "x-api-key";

fn extract_header_token(headers: &HeaderMap) -> Option<String> {
    if let Some(k) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(k.to_string());
    }
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

fn extract_query_token(query: Option<&str>) -> Option<String> {
    query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "key")
            .map(|(_, v)| v.into_owned())
    })
}

/// Accepts the service key from `x-api-key`, a bearer token or `?key=`.
#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<ViewVaultState> for RequireKeyAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ViewVaultState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            extract_header_token(&parts.headers).or_else(|| extract_query_token(parts.uri.query()));

        let Some(key) = token else {
            return Err(AuthError::MissingKey);
        };
        let expected = state.viewvault_key.as_ref();
        if key.as_bytes().ct_eq(expected.as_bytes()).into() {
            Ok(RequireKeyAuth)
        } else {
            Err(AuthError::InvalidKey)
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingKey,
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingKey => "Missing API key",
            AuthError::InvalidKey => "Invalid API key",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": "UNAUTHORIZED", "message": message } })),
        )
            .into_response()
    }
}
