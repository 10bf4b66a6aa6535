#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::StatusCode;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use viewvault::TmdbError;
use viewvault::tmdb::MetadataSource;
use viewvault::vault::{ItemMetadata, MediaType, SearchHit};

/// Fresh SQLite file under the temp dir; returns (database_url, path).
pub fn temp_database(tag: &str) -> (String, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "viewvault-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    (format!("sqlite:{}", temp_path.display()), temp_path)
}

pub fn movie(external_id: u64, title: &str, year: &str, providers: &[&str]) -> ItemMetadata {
    ItemMetadata {
        external_id,
        title: title.to_string(),
        length: Some(100 + u32::try_from(external_id % 50).unwrap()),
        providers: Some(providers.iter().map(ToString::to_string).collect()),
        age_rating: Some("PG-13".to_string()),
        vote_average: Some(7.1),
        genres: vec!["Drama".to_string()],
        release_year: Some(year.to_string()),
        poster_path: Some(format!("/{external_id}.jpg")),
        imdb_id: Some(format!("tt{external_id:07}")),
    }
}

/// In-memory metadata source. Titles starting with `boom` fail upstream.
pub struct FakeMetadata {
    pub catalog: Vec<(MediaType, ItemMetadata)>,
    pub fetches: AtomicUsize,
}

impl FakeMetadata {
    pub fn new(catalog: Vec<(MediaType, ItemMetadata)>) -> Self {
        Self {
            catalog,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

fn upstream(status: StatusCode, message: &str) -> TmdbError {
    TmdbError::Upstream {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl MetadataSource for FakeMetadata {
    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
        year: Option<&str>,
    ) -> Result<Vec<SearchHit>, TmdbError> {
        if query.to_lowercase().starts_with("boom") {
            return Err(upstream(StatusCode::SERVICE_UNAVAILABLE, "search exploded"));
        }
        Ok(self
            .catalog
            .iter()
            .filter(|(t, meta)| {
                *t == media_type
                    && meta.title.eq_ignore_ascii_case(query)
                    && year.is_none_or(|y| meta.release_year.as_deref() == Some(y))
            })
            .map(|(_, meta)| SearchHit {
                external_id: meta.external_id,
                title: meta.title.clone(),
                release_year: meta.release_year.clone(),
                poster_path: meta.poster_path.clone(),
            })
            .collect())
    }

    async fn fetch_item(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> Result<ItemMetadata, TmdbError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.catalog
            .iter()
            .find(|(t, meta)| *t == media_type && meta.external_id == external_id)
            .map(|(_, meta)| meta.clone())
            .ok_or_else(|| upstream(StatusCode::NOT_FOUND, "The resource you requested could not be found."))
    }
}
