use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// `GET /movie/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// `GET /tv/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// `GET /{movie|tv}/{id}/external_ids`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl ExternalIds {
    /// TMDB reports a missing IMDb id as `null` or `""`.
    pub fn imdb(&self) -> Option<&str> {
        self.imdb_id.as_deref().filter(|id| !id.is_empty())
    }
}
