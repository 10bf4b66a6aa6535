use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::error::ViewVaultError;
use crate::server::router::ViewVaultState;
use crate::vault::{MediaType, SearchHit};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub query: String,
    #[serde(default)]
    pub year: Option<String>,
}

pub async fn search(
    State(state): State<ViewVaultState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ViewVaultError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ViewVaultError::invalid("query must not be empty"));
    }
    let year = params
        .year
        .as_deref()
        .map(str::trim)
        .filter(|y| !y.is_empty());
    let hits = state
        .metadata
        .search(params.media_type, query, year)
        .await?;
    Ok(Json(hits))
}

pub fn router() -> Router<ViewVaultState> {
    Router::new().route("/search", get(search))
}
