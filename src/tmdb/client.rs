use ahash::RandomState;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::sync::Cache;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use viewvault_schema::{Genre, MovieDetails, TvDetails, year_of};

use super::MetadataSource;
use super::api::TmdbApi;
use crate::config::TmdbConfig;
use crate::error::TmdbError;
use crate::utils::logging::with_pretty_json_debug;
use crate::vault::{ItemMetadata, MediaType, SearchHit};

const USER_AGENT: &str = concat!("viewvault/", env!("CARGO_PKG_VERSION"));

type SearchKey = (MediaType, String, Option<String>);

fn build_http_client(cfg: &TmdbConfig) -> Result<reqwest::Client, TmdbError> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30));

    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if cfg.enable_multiplexing {
        builder = builder.http2_adaptive_window(true);
    } else {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    }

    Ok(builder.default_headers(headers).build()?)
}

fn genre_names(genres: &[Genre]) -> Vec<String> {
    genres.iter().map(|g| g.name.clone()).collect()
}

/// TMDB reports unknown runtimes and episode counts as `0`.
fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

/// Rate-limited, cached TMDB metadata source.
pub struct TmdbClient {
    api: TmdbApi,
    region: String,
    limiter: Arc<DefaultDirectRateLimiter>,
    items: Cache<(MediaType, u64), ItemMetadata, RandomState>,
    searches: Cache<SearchKey, Arc<Vec<SearchHit>>, RandomState>,
}

impl TmdbClient {
    pub fn new(cfg: &TmdbConfig) -> Result<Self, TmdbError> {
        if cfg.api_key.trim().is_empty() {
            return Err(TmdbError::MissingApiKey);
        }

        let api = TmdbApi::new(
            build_http_client(cfg)?,
            cfg.base_url.clone(),
            cfg.api_key.clone(),
            cfg.language.clone(),
            cfg.retry_max_times,
        );

        let rps = NonZeroU32::new(cfg.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = rps.saturating_mul(NonZeroU32::MIN.saturating_add(1));
        let limiter = Arc::new(RateLimiter::direct(
            Quota::per_second(rps).allow_burst(burst),
        ));

        let ttl = Duration::from_secs(cfg.cache_ttl_secs.max(1));
        let capacity = cfg.cache_capacity.max(1);
        let items = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build_with_hasher(RandomState::new());
        let searches = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build_with_hasher(RandomState::new());

        Ok(Self {
            api,
            region: cfg.region.clone(),
            limiter,
            items,
            searches,
        })
    }

    async fn limited<T>(
        &self,
        call: impl Future<Output = Result<T, TmdbError>>,
    ) -> Result<T, TmdbError> {
        self.limiter.until_ready().await;
        call.await
    }

    /// Secondary lookups (ratings, providers, ids) degrade to `None` instead of failing the item.
    fn soft<T>(result: Result<T, TmdbError>, what: &'static str, id: u64) -> Option<T> {
        result
            .inspect_err(|e| warn!(id, what, error = %e, "[TMDB] secondary lookup failed"))
            .ok()
    }

    /// Returns the metadata and whether every secondary lookup answered.
    async fn movie_metadata(&self, id: u64) -> Result<(ItemMetadata, bool), TmdbError> {
        let (details, release_dates, providers) = tokio::join!(
            self.limited(self.api.movie_details(id)),
            self.limited(self.api.movie_release_dates(id)),
            self.limited(self.api.watch_providers(MediaType::Movies, id)),
        );
        let details: MovieDetails = details?;
        let complete = release_dates.is_ok() && providers.is_ok();

        let age_rating = Self::soft(release_dates, "release_dates", id)
            .and_then(|r| r.certification_for(&self.region).map(str::to_string));
        let providers =
            Self::soft(providers, "watch_providers", id).map(|p| p.flatrate_names(&self.region));

        let meta = ItemMetadata {
            external_id: details.id,
            length: non_zero(details.runtime),
            providers,
            age_rating,
            vote_average: details.vote_average,
            genres: genre_names(&details.genres),
            release_year: year_of(details.release_date.as_deref()),
            poster_path: details.poster_path,
            imdb_id: details.imdb_id.filter(|s| !s.is_empty()),
            title: details.title,
        };
        Ok((meta, complete))
    }

    async fn show_metadata(&self, id: u64) -> Result<(ItemMetadata, bool), TmdbError> {
        let (details, ratings, providers, external_ids) = tokio::join!(
            self.limited(self.api.tv_details(id)),
            self.limited(self.api.tv_content_ratings(id)),
            self.limited(self.api.watch_providers(MediaType::Tvshows, id)),
            self.limited(self.api.external_ids(MediaType::Tvshows, id)),
        );
        let details: TvDetails = details?;
        let complete = ratings.is_ok() && providers.is_ok() && external_ids.is_ok();

        let age_rating = Self::soft(ratings, "content_ratings", id)
            .and_then(|r| r.rating_for(&self.region).map(str::to_string));
        let providers =
            Self::soft(providers, "watch_providers", id).map(|p| p.flatrate_names(&self.region));
        let imdb_id = Self::soft(external_ids, "external_ids", id)
            .and_then(|ids| ids.imdb().map(str::to_string));

        let meta = ItemMetadata {
            external_id: details.id,
            length: non_zero(details.number_of_episodes),
            providers,
            age_rating,
            vote_average: details.vote_average,
            genres: genre_names(&details.genres),
            release_year: year_of(details.first_air_date.as_deref()),
            poster_path: details.poster_path,
            imdb_id,
            title: details.name,
        };
        Ok((meta, complete))
    }

    /// Fetches from upstream and replaces the cache entry.
    /// Partial results are served but never cached.
    async fn load_item(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> Result<ItemMetadata, TmdbError> {
        let (meta, complete) = match media_type {
            MediaType::Movies => self.movie_metadata(external_id).await?,
            MediaType::Tvshows => self.show_metadata(external_id).await?,
        };
        with_pretty_json_debug(&meta, |pretty| {
            debug!(%media_type, external_id, complete, metadata = %pretty, "[TMDB] fetched item metadata");
        });

        let key = (media_type, external_id);
        if complete {
            self.items.insert(key, meta.clone());
        } else {
            self.items.invalidate(&key);
        }
        Ok(meta)
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
        year: Option<&str>,
    ) -> Result<Vec<SearchHit>, TmdbError> {
        let key: SearchKey = (
            media_type,
            query.trim().to_lowercase(),
            year.map(str::to_string),
        );
        if let Some(hits) = self.searches.get(&key) {
            return Ok(hits.as_ref().clone());
        }

        let hits: Vec<SearchHit> = match media_type {
            MediaType::Movies => self
                .limited(self.api.search_movies(query.trim(), year))
                .await?
                .results
                .into_iter()
                .map(|r| SearchHit {
                    external_id: r.id,
                    release_year: year_of(r.release_date.as_deref()),
                    title: r.title,
                    poster_path: r.poster_path,
                })
                .collect(),
            MediaType::Tvshows => self
                .limited(self.api.search_tv(query.trim(), year))
                .await?
                .results
                .into_iter()
                .map(|r| SearchHit {
                    external_id: r.id,
                    release_year: year_of(r.first_air_date.as_deref()),
                    title: r.name,
                    poster_path: r.poster_path,
                })
                .collect(),
        };

        debug!(%media_type, query, hits = hits.len(), "[TMDB] search");
        self.searches.insert(key, Arc::new(hits.clone()));
        Ok(hits)
    }

    async fn fetch_item(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> Result<ItemMetadata, TmdbError> {
        if let Some(meta) = self.items.get(&(media_type, external_id)) {
            return Ok(meta);
        }
        self.load_item(media_type, external_id).await
    }

    async fn refetch_item(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> Result<ItemMetadata, TmdbError> {
        self.load_item(media_type, external_id).await
    }
}
