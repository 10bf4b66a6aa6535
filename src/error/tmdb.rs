use axum::http::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;

#[derive(Debug, ThisError)]
pub enum TmdbError {
    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("TMDB payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Non-2xx answer; `message` is TMDB's `status_message` or a body preview.
    #[error("TMDB returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("TMDB api key is not configured")]
    MissingApiKey,
}

impl TmdbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TmdbError::Upstream { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl IsRetryable for TmdbError {
    fn is_retryable(&self) -> bool {
        match self {
            TmdbError::Reqwest(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TmdbError::Upstream { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            TmdbError::UrlError(_) | TmdbError::Payload(_) | TmdbError::MissingApiKey => false,
        }
    }
}
