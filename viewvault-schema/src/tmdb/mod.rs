//! Wire types for the TMDB v3 REST API.
//!
//! Only the fields ViewVault reads are modelled; everything else is ignored on
//! deserialization.

mod details;
mod providers;
mod ratings;
mod search;

pub use details::{ExternalIds, Genre, MovieDetails, TvDetails};
pub use providers::{RegionProviders, WatchProvider, WatchProvidersResponse};
pub use ratings::{
    ContentRating, ContentRatingsResponse, CountryReleaseDates, ReleaseDate, ReleaseDatesResponse,
};
pub use search::{MovieSearchResult, SearchPage, TvSearchResult};

use serde::{Deserialize, Serialize};

/// Error payload TMDB returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbErrorBody {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Extracts the leading four-digit year of a TMDB date (`YYYY-MM-DD`).
///
/// TMDB sends `""` for unknown dates, which yields `None`.
pub fn year_of(date: Option<&str>) -> Option<String> {
    let date = date?.trim();
    let year = date.get(..4)?;
    year.bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| year.to_string())
}
