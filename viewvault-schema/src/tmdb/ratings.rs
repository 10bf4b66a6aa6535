use serde::{Deserialize, Serialize};

/// `GET /movie/{id}/release_dates`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReleaseDatesResponse {
    #[serde(default)]
    pub results: Vec<CountryReleaseDates>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountryReleaseDates {
    pub iso_3166_1: String,
    #[serde(default)]
    pub release_dates: Vec<ReleaseDate>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseDate {
    #[serde(default)]
    pub certification: String,
}

impl ReleaseDatesResponse {
    /// First non-empty certification published for `region`.
    pub fn certification_for(&self, region: &str) -> Option<&str> {
        self.results
            .iter()
            .filter(|c| c.iso_3166_1.eq_ignore_ascii_case(region))
            .flat_map(|c| c.release_dates.iter())
            .map(|d| d.certification.trim())
            .find(|cert| !cert.is_empty())
    }
}

/// `GET /tv/{id}/content_ratings`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentRatingsResponse {
    #[serde(default)]
    pub results: Vec<ContentRating>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentRating {
    pub iso_3166_1: String,
    #[serde(default)]
    pub rating: String,
}

impl ContentRatingsResponse {
    pub fn rating_for(&self, region: &str) -> Option<&str> {
        self.results
            .iter()
            .filter(|r| r.iso_3166_1.eq_ignore_ascii_case(region))
            .map(|r| r.rating.trim())
            .find(|rating| !rating.is_empty())
    }
}
