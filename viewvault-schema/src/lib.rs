pub mod tmdb;

pub use tmdb::{
    ContentRatingsResponse, ExternalIds, Genre, MovieDetails, MovieSearchResult,
    ReleaseDatesResponse, SearchPage, TmdbErrorBody, TvDetails, TvSearchResult,
    WatchProvidersResponse, year_of,
};
