mod basic;
mod tmdb;

pub use basic::BasicConfig;
pub use tmdb::TmdbConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Metadata API settings (see `tmdb` table in config.toml).
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "VIEWVAULT_";

impl Config {
    /// Builds a Figment that merges defaults, a config TOML file and
    /// `VIEWVAULT_`-prefixed environment variables (`VIEWVAULT_TMDB__API_KEY`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration by merging defaults, `config.toml` if present and the environment.
    ///
    /// Note: this does **not** validate required fields like `basic.viewvault_key`. Binaries
    /// should call `Config::load()` instead.
    pub fn from_optional_sources() -> Self {
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + config.toml + env): {err}")
        });
        cfg.normalized()
    }

    fn normalized(mut self) -> Self {
        self.tmdb = self.tmdb.with_base_dir();
        self
    }

    /// Loads configuration and validates required fields.
    pub fn load() -> Self {
        let cfg = Self::from_optional_sources();
        if cfg.basic.viewvault_key.trim().is_empty() {
            panic!("basic.viewvault_key must be set and non-empty");
        }
        if cfg.tmdb.api_key.trim().is_empty() {
            panic!("tmdb.api_key must be set and non-empty");
        }
        cfg
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);
