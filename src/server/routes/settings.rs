use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::info;

use crate::db::{DbActorHandle, SettingsUpsert};
use crate::error::ViewVaultError;
use crate::server::router::ViewVaultState;
use crate::vault::{MediaType, Settings};

/// Saved settings, or empty settings when the user never stored any.
pub(crate) async fn load_settings(
    db: &DbActorHandle,
    uid: &str,
    media_type: MediaType,
) -> Result<Settings, ViewVaultError> {
    Ok(db
        .get_settings(uid, media_type)
        .await?
        .map(Settings::from)
        .unwrap_or_default())
}

pub async fn get_settings(
    State(state): State<ViewVaultState>,
    Path((uid, media_type)): Path<(String, String)>,
) -> Result<Json<Settings>, ViewVaultError> {
    let media_type: MediaType = media_type.parse()?;
    Ok(Json(load_settings(&state.db, &uid, media_type).await?))
}

pub async fn put_settings(
    State(state): State<ViewVaultState>,
    Path((uid, media_type)): Path<(String, String)>,
    Json(body): Json<Settings>,
) -> Result<Json<Settings>, ViewVaultError> {
    let media_type: MediaType = media_type.parse()?;
    let settings = body.normalized()?;
    state
        .db
        .put_settings(SettingsUpsert {
            uid: uid.clone(),
            media_type,
            providers: settings.providers.clone(),
            watch_sites: settings.watch_sites.clone(),
        })
        .await?;
    info!(
        uid,
        %media_type,
        providers = settings.providers.len(),
        watch_sites = settings.watch_sites.len(),
        "settings saved"
    );
    Ok(Json(settings))
}

pub fn router() -> Router<ViewVaultState> {
    Router::new().route(
        "/users/{uid}/settings/{media_type}",
        get(get_settings).put(put_settings),
    )
}
