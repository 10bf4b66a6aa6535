use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};

/// `[basic]`: where the vault API listens, where vaults are stored and the shared key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Interface the vault API binds to. TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: IpAddr,

    /// TOML: `basic.listen_port`. Default: `8188`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// SQLite file holding vaults, items and settings; created if missing.
    /// TOML: `basic.database_url`. Default: `sqlite://viewvault.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Key every vault request must present (`x-api-key`, bearer token or `?key=`).
    /// TOML: `basic.viewvault_key`. Required; numbers are read as strings.
    #[serde(default, deserialize_with = "key_from_string_or_number")]
    pub viewvault_key: String,

    /// Largest watchlist text `POST .../import` accepts, in bytes.
    /// TOML: `basic.import_body_limit`. Default: 1 MiB.
    #[serde(default = "default_import_body_limit")]
    pub import_body_limit: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            viewvault_key: String::new(),
            import_body_limit: default_import_body_limit(),
        }
    }
}

fn key_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(key) => Ok(key),
        Value::Number(key) => Ok(key.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "basic.viewvault_key must be a string or a number, got {other}"
        ))),
    }
}

fn default_listen_addr() -> IpAddr {
    Ipv4Addr::UNSPECIFIED.into()
}

fn default_listen_port() -> u16 {
    8188
}

fn default_database_url() -> String {
    "sqlite://viewvault.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_import_body_limit() -> usize {
    1024 * 1024
}
