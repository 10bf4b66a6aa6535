use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use tracing::info;

use crate::db::VaultCreate;
use crate::error::ViewVaultError;
use crate::server::router::ViewVaultState;
use crate::vault::{MediaType, Vault};

#[derive(Debug, Deserialize)]
pub struct ListVaultsQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVaultBody {
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

fn to_vaults(rows: Vec<crate::db::DbVault>) -> Result<Vec<Vault>, ViewVaultError> {
    rows.into_iter().map(Vault::try_from).collect()
}

pub async fn list_vaults(
    State(state): State<ViewVaultState>,
    Path(uid): Path<String>,
    Query(query): Query<ListVaultsQuery>,
) -> Result<Json<Vec<Vault>>, ViewVaultError> {
    let media_type = query
        .media_type
        .as_deref()
        .map(str::parse::<MediaType>)
        .transpose()?;
    if let Some(media_type) = media_type {
        state.db.ensure_default_vault(&uid, media_type).await?;
    }
    let rows = state.db.list_vaults(&uid, media_type).await?;
    Ok(Json(to_vaults(rows)?))
}

pub async fn create_vault(
    State(state): State<ViewVaultState>,
    Path(uid): Path<String>,
    Json(body): Json<CreateVaultBody>,
) -> Result<(StatusCode, Json<Vault>), ViewVaultError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ViewVaultError::invalid("vault name must not be empty"));
    }
    let row = state
        .db
        .create_vault(VaultCreate {
            uid: uid.clone(),
            name: name.to_string(),
            media_type: body.media_type,
        })
        .await?;
    let vault = Vault::try_from(row)?;
    info!(uid, vault_id = vault.id, name = %vault.name, "vault created");
    Ok((StatusCode::CREATED, Json(vault)))
}

pub async fn delete_vault(
    State(state): State<ViewVaultState>,
    Path((uid, vault_id)): Path<(String, i64)>,
) -> Result<StatusCode, ViewVaultError> {
    state.db.delete_vault(&uid, vault_id).await?;
    info!(uid, vault_id, "vault deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<ViewVaultState> {
    Router::new()
        .route(
            "/users/{uid}/vaults",
            get(list_vaults).post(create_vault),
        )
        .route("/users/{uid}/vaults/{vault}", delete(delete_vault))
}
