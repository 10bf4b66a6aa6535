use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ViewVaultError;

/// Media kinds a vault can hold. Anime and manga are tracked as `tvshows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movies,
    Tvshows,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Movies, MediaType::Tvshows];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movies => "movies",
            MediaType::Tvshows => "tvshows",
        }
    }

    /// Item table holding this media type.
    pub(crate) fn table(self) -> &'static str {
        self.as_str()
    }

    /// Column holding runtime (movies) or episode count (shows).
    pub(crate) fn length_column(self) -> &'static str {
        match self {
            MediaType::Movies => "runtime",
            MediaType::Tvshows => "episodes",
        }
    }

    pub fn default_vault_name(self) -> &'static str {
        match self {
            MediaType::Movies => "My Movies",
            MediaType::Tvshows => "My TV Shows",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = ViewVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movies" | "movie" => Ok(MediaType::Movies),
            "tvshows" | "tv" | "shows" => Ok(MediaType::Tvshows),
            other => Err(ViewVaultError::invalid(format!(
                "unknown media type `{other}` (expected movies or tvshows)"
            ))),
        }
    }
}

/// A named watchlist collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub id: i64,
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Normalized movie/show entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub external_id: u64,
    pub title: String,
    pub watched: bool,
    pub user_rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<u32>,
    pub providers: Vec<String>,
    pub age_rating: Option<String>,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
    pub release_year: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl Item {
    /// Release year as a number; `None` when missing or unparseable.
    pub fn year(&self) -> Option<i32> {
        self.release_year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok())
    }
}

/// Metadata assembled from the metadata API for a new item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub external_id: u64,
    pub title: String,
    /// Runtime in minutes for movies, episode count for shows.
    pub length: Option<u32>,
    /// `None` when the providers lookup failed, as opposed to an empty list.
    pub providers: Option<Vec<String>>,
    pub age_rating: Option<String>,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
    pub release_year: Option<String>,
    pub poster_path: Option<String>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub external_id: u64,
    pub title: String,
    pub release_year: Option<String>,
    pub poster_path: Option<String>,
}

/// External site a title can be searched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSite {
    pub name: String,
    pub url: String,
    /// Replacement for spaces in the title, e.g. `+` or `%20`.
    #[serde(default)]
    pub space_format: String,
}

/// Per user, per media type preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub watch_sites: Vec<WatchSite>,
}

impl Settings {
    /// Trims and deduplicates provider names and rejects incomplete watch sites.
    pub fn normalized(self) -> Result<Self, ViewVaultError> {
        let mut providers: Vec<String> = Vec::with_capacity(self.providers.len());
        for name in self.providers {
            let name = name.trim();
            if !name.is_empty() && !providers.iter().any(|p| p == name) {
                providers.push(name.to_string());
            }
        }

        let watch_sites = self
            .watch_sites
            .into_iter()
            .map(|site| {
                let name = site.name.trim().to_string();
                let url = site.url.trim().to_string();
                if name.is_empty() || url.is_empty() {
                    return Err(ViewVaultError::invalid(
                        "watch site requires a non-empty name and url",
                    ));
                }
                Ok(WatchSite {
                    name,
                    url,
                    space_format: site.space_format,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            providers,
            watch_sites,
        })
    }
}

/// Which vault a request targets: a user's default vault of a media type, or a custom vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultSelector {
    Default(MediaType),
    Custom(i64),
}

impl FromStr for VaultSelector {
    type Err = ViewVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<i64>() {
            return Ok(VaultSelector::Custom(id));
        }
        s.parse::<MediaType>()
            .map(VaultSelector::Default)
            .map_err(|_| ViewVaultError::invalid(format!("invalid vault selector `{s}`")))
    }
}

/// Resolved storage location of a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPath {
    pub uid: String,
    pub media_type: MediaType,
    pub vault_id: i64,
    pub is_default: bool,
}

impl VaultPath {
    pub fn of(vault: &Vault) -> Self {
        Self {
            uid: vault.uid.clone(),
            media_type: vault.media_type,
            vault_id: vault.id,
            is_default: vault.is_default,
        }
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default {
            write!(f, "users/{}/{}", self.uid, self.media_type)
        } else {
            write!(f, "users/{}/vaults/{}", self.uid, self.vault_id)
        }
    }
}
