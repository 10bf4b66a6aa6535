//! Metadata source: the TMDB client behind the `MetadataSource` seam.

pub mod api;
pub mod client;

pub use client::TmdbClient;

use async_trait::async_trait;

use crate::error::TmdbError;
use crate::vault::{ItemMetadata, MediaType, SearchHit};

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Title search; `year` narrows by release (movies) or first air date (shows).
    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
        year: Option<&str>,
    ) -> Result<Vec<SearchHit>, TmdbError>;

    /// Full metadata for one title: details, age rating, providers, external ids.
    async fn fetch_item(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> Result<ItemMetadata, TmdbError>;

    /// Like `fetch_item`, but never answers from a cache.
    async fn refetch_item(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> Result<ItemMetadata, TmdbError> {
        self.fetch_item(media_type, external_id).await
    }
}
