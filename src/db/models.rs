use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbVault {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub media_type: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Row of the `movies` table, raw stored field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbMovie {
    pub id: i64,
    pub vault_id: i64,
    pub tmdbid: i64,
    pub movietitle: String,
    pub watched: bool,
    pub userrating: Option<f64>,
    pub runtime: Option<i64>,
    /// JSON array, decoded on read.
    pub providers: String,
    pub agerating: Option<String>,
    pub voteaverage: Option<f64>,
    /// JSON array, decoded on read.
    pub genres: String,
    pub releasedate: Option<String>,
    pub posterpath: Option<String>,
    pub imdbid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `tvshows` table, raw stored field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbShow {
    pub id: i64,
    pub vault_id: i64,
    pub tmdbid: i64,
    pub showtitle: String,
    pub watched: bool,
    pub userrating: Option<f64>,
    pub episodes: Option<i64>,
    pub providers: String,
    pub agerating: Option<String>,
    pub voteaverage: Option<f64>,
    pub genres: String,
    pub firstairdate: Option<String>,
    pub posterpath: Option<String>,
    pub imdbid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbSettings {
    pub uid: String,
    pub media_type: String,
    pub providers: String,
    pub watch_sites: String,
    pub updated_at: DateTime<Utc>,
}

/// Full read of one vault, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Movies(Vec<DbMovie>),
    Shows(Vec<DbShow>),
}

impl Snapshot {
    pub fn len(&self) -> usize {
        match self {
            Snapshot::Movies(rows) => rows.len(),
            Snapshot::Shows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
