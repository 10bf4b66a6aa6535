//! Mapping between stored rows (raw field names) and normalized items.

use serde::de::DeserializeOwned;
use tracing::warn;

use super::model::{Item, ItemMetadata, MediaType, Settings, Vault, WatchSite};
use crate::db::{DbMovie, DbSettings, DbShow, DbVault, ItemCreate, MovieCreate, ShowCreate, Snapshot};
use crate::error::ViewVaultError;

/// Decodes a JSON list column. Corrupt values read as empty rather than failing the snapshot.
fn decode_list<T: DeserializeOwned>(raw: &str, field: &str, id: i64) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(id, field, error = %e, "undecodable list column; reading as empty");
        Vec::new()
    })
}

fn to_u32(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

#[allow(clippy::cast_possible_truncation)]
fn to_rating(value: Option<f64>) -> Option<f32> {
    value.map(|v| v as f32)
}

impl From<DbMovie> for Item {
    fn from(row: DbMovie) -> Self {
        Item {
            providers: decode_list(&row.providers, "providers", row.id),
            genres: decode_list(&row.genres, "genres", row.id),
            id: row.id,
            external_id: u64::try_from(row.tmdbid).unwrap_or_default(),
            title: row.movietitle,
            watched: row.watched,
            user_rating: to_rating(row.userrating),
            runtime: to_u32(row.runtime),
            episode_count: None,
            age_rating: row.agerating,
            vote_average: row.voteaverage,
            release_year: row.releasedate,
            poster_path: row.posterpath,
            imdb_id: row.imdbid,
        }
    }
}

impl From<DbShow> for Item {
    fn from(row: DbShow) -> Self {
        Item {
            providers: decode_list(&row.providers, "providers", row.id),
            genres: decode_list(&row.genres, "genres", row.id),
            id: row.id,
            external_id: u64::try_from(row.tmdbid).unwrap_or_default(),
            title: row.showtitle,
            watched: row.watched,
            user_rating: to_rating(row.userrating),
            runtime: None,
            episode_count: to_u32(row.episodes),
            age_rating: row.agerating,
            vote_average: row.voteaverage,
            release_year: row.firstairdate,
            poster_path: row.posterpath,
            imdb_id: row.imdbid,
        }
    }
}

/// Maps a full snapshot into normalized items, preserving store order.
pub fn normalize(snapshot: Snapshot) -> Vec<Item> {
    match snapshot {
        Snapshot::Movies(rows) => rows.into_iter().map(Item::from).collect(),
        Snapshot::Shows(rows) => rows.into_iter().map(Item::from).collect(),
    }
}

impl TryFrom<DbVault> for Vault {
    type Error = ViewVaultError;

    fn try_from(row: DbVault) -> Result<Self, Self::Error> {
        Ok(Vault {
            media_type: row.media_type.parse()?,
            id: row.id,
            uid: row.uid,
            name: row.name,
            is_default: row.is_default,
            created_at: row.created_at,
        })
    }
}

impl From<DbSettings> for Settings {
    fn from(row: DbSettings) -> Self {
        Settings {
            providers: decode_list::<String>(&row.providers, "providers", 0),
            watch_sites: decode_list::<WatchSite>(&row.watch_sites, "watch_sites", 0),
        }
    }
}

/// Builds the store payload for a new item.
pub fn item_create(
    media_type: MediaType,
    vault_id: i64,
    meta: &ItemMetadata,
    watched: bool,
    user_rating: Option<f32>,
) -> ItemCreate {
    let tmdbid = i64::try_from(meta.external_id).unwrap_or(i64::MAX);
    let userrating = user_rating.map(f64::from);
    let length = meta.length.map(i64::from);
    match media_type {
        MediaType::Movies => ItemCreate::Movie(MovieCreate {
            vault_id,
            tmdbid,
            movietitle: meta.title.clone(),
            watched,
            userrating,
            runtime: length,
            providers: meta.providers.clone().unwrap_or_default(),
            agerating: meta.age_rating.clone(),
            voteaverage: meta.vote_average,
            genres: meta.genres.clone(),
            releasedate: meta.release_year.clone(),
            posterpath: meta.poster_path.clone(),
            imdbid: meta.imdb_id.clone(),
        }),
        MediaType::Tvshows => ItemCreate::Show(ShowCreate {
            vault_id,
            tmdbid,
            showtitle: meta.title.clone(),
            watched,
            userrating,
            episodes: length,
            providers: meta.providers.clone().unwrap_or_default(),
            agerating: meta.age_rating.clone(),
            voteaverage: meta.vote_average,
            genres: meta.genres.clone(),
            firstairdate: meta.release_year.clone(),
            posterpath: meta.poster_path.clone(),
            imdbid: meta.imdb_id.clone(),
        }),
    }
}

/// The item a successful insert of `create` produces, mirrored locally.
pub fn item_from_create(id: i64, create: ItemCreate) -> Item {
    match create {
        ItemCreate::Movie(c) => Item {
            id,
            external_id: u64::try_from(c.tmdbid).unwrap_or_default(),
            title: c.movietitle,
            watched: c.watched,
            user_rating: to_rating(c.userrating),
            runtime: to_u32(c.runtime),
            episode_count: None,
            providers: c.providers,
            age_rating: c.agerating,
            vote_average: c.voteaverage,
            genres: c.genres,
            release_year: c.releasedate,
            poster_path: c.posterpath,
            imdb_id: c.imdbid,
        },
        ItemCreate::Show(c) => Item {
            id,
            external_id: u64::try_from(c.tmdbid).unwrap_or_default(),
            title: c.showtitle,
            watched: c.watched,
            user_rating: to_rating(c.userrating),
            runtime: None,
            episode_count: to_u32(c.episodes),
            providers: c.providers,
            age_rating: c.agerating,
            vote_average: c.voteaverage,
            genres: c.genres,
            release_year: c.firstairdate,
            poster_path: c.posterpath,
            imdb_id: c.imdbid,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movie_row() -> DbMovie {
        DbMovie {
            id: 3,
            vault_id: 1,
            tmdbid: 603,
            movietitle: "The Matrix".to_string(),
            watched: true,
            userrating: Some(9.5),
            runtime: Some(136),
            providers: r#"["Netflix","Max"]"#.to_string(),
            agerating: Some("R".to_string()),
            voteaverage: Some(8.2),
            genres: r#"["Action","Science Fiction"]"#.to_string(),
            releasedate: Some("1999".to_string()),
            posterpath: Some("/p.jpg".to_string()),
            imdbid: Some("tt0133093".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn movie_row_maps_raw_field_names() {
        let item = Item::from(movie_row());
        assert_eq!(item.id, 3);
        assert_eq!(item.external_id, 603);
        assert_eq!(item.title, "The Matrix");
        assert!(item.watched);
        assert_eq!(item.user_rating, Some(9.5));
        assert_eq!(item.runtime, Some(136));
        assert_eq!(item.episode_count, None);
        assert_eq!(item.providers, vec!["Netflix", "Max"]);
        assert_eq!(item.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(item.vote_average, Some(8.2));
        assert_eq!(item.release_year.as_deref(), Some("1999"));
    }

    #[test]
    fn corrupt_provider_column_reads_as_empty() {
        let mut row = movie_row();
        row.providers = "Netflix".to_string();
        let item = Item::from(row);
        assert!(item.providers.is_empty());
        assert_eq!(item.genres.len(), 2);
    }

    #[test]
    fn show_create_mirrors_into_item() {
        let meta = ItemMetadata {
            external_id: 1396,
            title: "Breaking Bad".to_string(),
            length: Some(62),
            providers: Some(vec!["Netflix".to_string()]),
            age_rating: Some("TV-MA".to_string()),
            vote_average: Some(8.9),
            genres: vec!["Drama".to_string()],
            release_year: Some("2008".to_string()),
            poster_path: None,
            imdb_id: Some("tt0903747".to_string()),
        };
        let create = item_create(MediaType::Tvshows, 9, &meta, false, Some(10.0));
        assert_eq!(create.media_type(), MediaType::Tvshows);
        assert_eq!(create.vault_id(), 9);

        let item = item_from_create(11, create);
        assert_eq!(item.id, 11);
        assert_eq!(item.external_id, 1396);
        assert_eq!(item.episode_count, Some(62));
        assert_eq!(item.runtime, None);
        assert_eq!(item.user_rating, Some(10.0));
        assert!(!item.watched);
    }
}
