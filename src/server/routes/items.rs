use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::open_session;
use super::settings::load_settings;
use crate::error::ViewVaultError;
use crate::server::router::ViewVaultState;
use crate::vault::{Item, SortKey, Vault, WatchLink, links_for};

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    /// Comma separated provider names; falls back to saved settings when absent.
    pub providers: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListing {
    pub vault: Vault,
    pub sort: SortKey,
    pub providers: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub external_id: u64,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub user_rating: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBody {
    pub user_rating: Option<f32>,
}

fn split_providers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn list_items(
    State(state): State<ViewVaultState>,
    Path((uid, selector)): Path<(String, String)>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ItemListing>, ViewVaultError> {
    let sort: SortKey = query.sort.as_deref().unwrap_or_default().parse()?;
    let session = open_session(&state, &uid, &selector).await?;

    let providers = match query.providers.as_deref() {
        Some(raw) => split_providers(raw),
        None => {
            load_settings(&state.db, &uid, session.media_type())
                .await?
                .providers
        }
    };

    Ok(Json(ItemListing {
        items: session.view(&providers, sort),
        vault: session.vault().clone(),
        sort,
        providers,
    }))
}

pub async fn add_item(
    State(state): State<ViewVaultState>,
    Path((uid, selector)): Path<(String, String)>,
    Json(body): Json<AddItemBody>,
) -> Result<(StatusCode, Json<Item>), ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    if session.contains_external(body.external_id) {
        return Err(ViewVaultError::ItemExists(body.external_id));
    }

    let meta = state
        .metadata
        .fetch_item(session.media_type(), body.external_id)
        .await?;
    let item = session
        .insert(&meta, body.watched, body.user_rating)
        .await?
        .cloned()
        .ok_or(ViewVaultError::ItemExists(body.external_id))?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn clear_items(
    State(state): State<ViewVaultState>,
    Path((uid, selector)): Path<(String, String)>,
) -> Result<Json<Value>, ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    let removed = session.clear().await?;
    Ok(Json(json!({ "removed": removed })))
}

pub async fn toggle_watched(
    State(state): State<ViewVaultState>,
    Path((uid, selector, item_id)): Path<(String, String, i64)>,
) -> Result<Json<Item>, ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    let item = session.toggle_watched(item_id).await?;
    Ok(Json(item.clone()))
}

pub async fn set_rating(
    State(state): State<ViewVaultState>,
    Path((uid, selector, item_id)): Path<(String, String, i64)>,
    Json(body): Json<RatingBody>,
) -> Result<Json<Item>, ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    let item = session.set_rating(item_id, body.user_rating).await?;
    Ok(Json(item.clone()))
}

pub async fn delete_item(
    State(state): State<ViewVaultState>,
    Path((uid, selector, item_id)): Path<(String, String, i64)>,
) -> Result<StatusCode, ViewVaultError> {
    let mut session = open_session(&state, &uid, &selector).await?;
    session.delete(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn watch_links(
    State(state): State<ViewVaultState>,
    Path((uid, selector, item_id)): Path<(String, String, i64)>,
) -> Result<Json<Vec<WatchLink>>, ViewVaultError> {
    let session = open_session(&state, &uid, &selector).await?;
    let item = session.item(item_id)?;
    let settings = load_settings(&state.db, &uid, session.media_type()).await?;
    Ok(Json(links_for(item, &settings.watch_sites)))
}

pub fn router() -> Router<ViewVaultState> {
    Router::new()
        .route(
            "/users/{uid}/vaults/{vault}/items",
            get(list_items).post(add_item).delete(clear_items),
        )
        .route(
            "/users/{uid}/vaults/{vault}/items/{item_id}",
            delete(delete_item),
        )
        .route(
            "/users/{uid}/vaults/{vault}/items/{item_id}/toggle-watched",
            post(toggle_watched),
        )
        .route(
            "/users/{uid}/vaults/{vault}/items/{item_id}/rating",
            put(set_rating),
        )
        .route(
            "/users/{uid}/vaults/{vault}/items/{item_id}/watch-links",
            get(watch_links),
        )
}

#[cfg(test)]
mod tests {
    use super::split_providers;

    #[test]
    fn provider_param_is_trimmed_and_split() {
        assert_eq!(
            split_providers(" Netflix, ,Hulu ,"),
            vec!["Netflix".to_string(), "Hulu".to_string()]
        );
        assert!(split_providers("").is_empty());
    }
}
