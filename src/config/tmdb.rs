use serde::{Deserialize, Serialize};
use url::Url;

/// TMDB client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// v3 API key, sent as the `api_key` query parameter.
    /// TOML: `tmdb.api_key`. Must be provided for metadata calls.
    #[serde(default)]
    pub api_key: String,

    /// API root. TOML: `tmdb.base_url`. Default: `https://api.themoviedb.org/3/`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Region used for certifications and watch providers.
    /// TOML: `tmdb.region`. Default: `US`.
    #[serde(default = "default_region")]
    pub region: String,

    /// TOML: `tmdb.language`. Default: `en-US`.
    #[serde(default = "default_language")]
    pub language: String,

    /// Optional upstream HTTP proxy.
    /// TOML: `tmdb.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing; disabled forces HTTP/1.
    /// TOML: `tmdb.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// Max retry attempts for upstream calls.
    /// TOML: `tmdb.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Client-side request budget.
    /// TOML: `tmdb.requests_per_second`. Default: `20`.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// TOML: `tmdb.cache_ttl_secs`. Default: `600`.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// TOML: `tmdb.cache_capacity`. Default: `2048`.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Items refreshed concurrently per batch.
    /// TOML: `tmdb.refresh_batch_size`. Default: `5`.
    #[serde(default = "default_refresh_batch_size")]
    pub refresh_batch_size: usize,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            region: default_region(),
            language: default_language(),
            proxy: None,
            enable_multiplexing: false,
            retry_max_times: default_retry_max_times(),
            requests_per_second: default_requests_per_second(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            refresh_batch_size: default_refresh_batch_size(),
        }
    }
}

impl TmdbConfig {
    /// `Url::join` replaces the last segment unless the base path ends in `/`.
    pub(super) fn with_base_dir(mut self) -> Self {
        if !self.base_url.path().ends_with('/') {
            let path = format!("{}/", self.base_url.path());
            self.base_url.set_path(&path);
        }
        self
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.themoviedb.org/3/").expect("valid TMDB base URL")
}

fn default_region() -> String {
    "US".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_retry_max_times() -> usize {
    3
}

fn default_requests_per_second() -> u32 {
    20
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_cache_capacity() -> u64 {
    2048
}

fn default_refresh_batch_size() -> usize {
    5
}
