use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /{movie|tv}/{id}/watch/providers`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegionProviders {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<WatchProvider>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchProvider {
    pub provider_id: u64,
    pub provider_name: String,
}

impl WatchProvidersResponse {
    /// Subscription (flatrate) provider names available in `region`, in TMDB order.
    pub fn flatrate_names(&self, region: &str) -> Vec<String> {
        self.results
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(region))
            .map(|(_, providers)| {
                providers
                    .flatrate
                    .iter()
                    .map(|p| p.provider_name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
