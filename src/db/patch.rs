use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::ViewVaultError;
use crate::vault::{MediaType, WatchSite};

/// Abstraction for applying a patch payload/envelope to the database.
#[async_trait]
pub trait DbPatchable {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<(), ViewVaultError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultCreate {
    pub uid: String,
    pub name: String,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieCreate {
    pub vault_id: i64,
    pub tmdbid: i64,
    pub movietitle: String,
    pub watched: bool,
    pub userrating: Option<f64>,
    pub runtime: Option<i64>,
    pub providers: Vec<String>,
    pub agerating: Option<String>,
    pub voteaverage: Option<f64>,
    pub genres: Vec<String>,
    pub releasedate: Option<String>,
    pub posterpath: Option<String>,
    pub imdbid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowCreate {
    pub vault_id: i64,
    pub tmdbid: i64,
    pub showtitle: String,
    pub watched: bool,
    pub userrating: Option<f64>,
    pub episodes: Option<i64>,
    pub providers: Vec<String>,
    pub agerating: Option<String>,
    pub voteaverage: Option<f64>,
    pub genres: Vec<String>,
    pub firstairdate: Option<String>,
    pub posterpath: Option<String>,
    pub imdbid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ItemCreate {
    Movie(MovieCreate),
    Show(ShowCreate),
}

impl ItemCreate {
    pub fn media_type(&self) -> MediaType {
        match self {
            ItemCreate::Movie(_) => MediaType::Movies,
            ItemCreate::Show(_) => MediaType::Tvshows,
        }
    }

    pub fn vault_id(&self) -> i64 {
        match self {
            ItemCreate::Movie(m) => m.vault_id,
            ItemCreate::Show(s) => s.vault_id,
        }
    }
}

/// Field-level write against one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemFieldPatch {
    /// `None` => do not change; `Some(v)` => update
    pub watched: Option<bool>,
    /// `None` => do not change; `Some(None)` => clear; `Some(Some(v))` => update
    pub userrating: Option<Option<f64>>,
    /// Runtime (movies) or episode count (shows).
    pub length: Option<i64>,
    pub providers: Option<Vec<String>>,
    pub agerating: Option<String>,
    pub voteaverage: Option<f64>,
    pub posterpath: Option<String>,
    pub imdbid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemPatch {
    pub media_type: MediaType,
    pub vault_id: i64,
    pub id: i64,
    pub patch: ItemFieldPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpsert {
    pub uid: String,
    pub media_type: MediaType,
    pub providers: Vec<String>,
    pub watch_sites: Vec<WatchSite>,
}
