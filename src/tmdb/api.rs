//! Raw TMDB v3 endpoints. Every call is a GET authenticated with `api_key`
//! and retried on transport errors, 429 and 5xx.

use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;
use viewvault_schema::{
    ContentRatingsResponse, ExternalIds, MovieDetails, MovieSearchResult, ReleaseDatesResponse,
    SearchPage, TmdbErrorBody, TvDetails, TvSearchResult, WatchProvidersResponse,
};

use crate::error::{IsRetryable, TmdbError};
use crate::vault::MediaType;

const BODY_PREVIEW_CHARS: usize = 512;

/// Path segment TMDB uses for a media type.
pub(crate) fn kind(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movies => "movie",
        MediaType::Tvshows => "tv",
    }
}

#[derive(Clone)]
pub struct TmdbApi {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    language: String,
    retry_policy: ExponentialBuilder,
}

impl TmdbApi {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        api_key: String,
        language: String,
        retry_max_times: usize,
    ) -> Self {
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(retry_max_times)
            .with_jitter();
        Self {
            http,
            base_url,
            api_key,
            language,
            retry_policy,
        }
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TmdbError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("language", &self.language)
            .extend_pairs(query.iter().filter(|(_, v)| !v.is_empty()));
        Ok(url)
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, TmdbError> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<TmdbErrorBody>(&bytes) {
                Ok(body) if !body.status_message.is_empty() => body.status_message,
                _ => {
                    let raw = String::from_utf8_lossy(&bytes);
                    format!("{:.len$}", raw, len = BODY_PREVIEW_CHARS)
                }
            };
            return Err(TmdbError::Upstream { status, message });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        let url = self.endpoint(path, query)?;
        (|| self.get_once::<T>(&url))
            .retry(self.retry_policy)
            .when(TmdbError::is_retryable)
            .notify(|err, dur| {
                debug!(path, error = %err, retry_in = ?dur, "[TMDB] retrying request");
            })
            .await
    }

    pub async fn search_movies(
        &self,
        query: &str,
        year: Option<&str>,
    ) -> Result<SearchPage<MovieSearchResult>, TmdbError> {
        self.get_json(
            "search/movie",
            &[("query", query), ("year", year.unwrap_or_default())],
        )
        .await
    }

    pub async fn search_tv(
        &self,
        query: &str,
        year: Option<&str>,
    ) -> Result<SearchPage<TvSearchResult>, TmdbError> {
        self.get_json(
            "search/tv",
            &[
                ("query", query),
                ("first_air_date_year", year.unwrap_or_default()),
            ],
        )
        .await
    }

    pub async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
        self.get_json(&format!("movie/{id}"), &[]).await
    }

    pub async fn tv_details(&self, id: u64) -> Result<TvDetails, TmdbError> {
        self.get_json(&format!("tv/{id}"), &[]).await
    }

    pub async fn movie_release_dates(&self, id: u64) -> Result<ReleaseDatesResponse, TmdbError> {
        self.get_json(&format!("movie/{id}/release_dates"), &[])
            .await
    }

    pub async fn tv_content_ratings(&self, id: u64) -> Result<ContentRatingsResponse, TmdbError> {
        self.get_json(&format!("tv/{id}/content_ratings"), &[])
            .await
    }

    pub async fn watch_providers(
        &self,
        media_type: MediaType,
        id: u64,
    ) -> Result<WatchProvidersResponse, TmdbError> {
        self.get_json(&format!("{}/{id}/watch/providers", kind(media_type)), &[])
            .await
    }

    pub async fn external_ids(
        &self,
        media_type: MediaType,
        id: u64,
    ) -> Result<ExternalIds, TmdbError> {
        self.get_json(&format!("{}/{id}/external_ids", kind(media_type)), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> TmdbApi {
        TmdbApi::new(
            reqwest::Client::new(),
            Url::parse("https://api.themoviedb.org/3/").unwrap(),
            "k3y".to_string(),
            "en-US".to_string(),
            1,
        )
    }

    #[test]
    fn endpoint_keeps_base_path_and_skips_empty_params() {
        let url = api()
            .endpoint("search/movie", &[("query", "Blade Runner"), ("year", "")])
            .unwrap();
        assert_eq!(url.path(), "/3/search/movie");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("api_key".to_string(), "k3y".to_string()),
                ("language".to_string(), "en-US".to_string()),
                ("query".to_string(), "Blade Runner".to_string()),
            ]
        );
    }

    #[test]
    fn kind_maps_media_types() {
        assert_eq!(kind(MediaType::Movies), "movie");
        assert_eq!(kind(MediaType::Tvshows), "tv");
    }
}
