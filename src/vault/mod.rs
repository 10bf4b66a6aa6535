//! Vault domain: normalized models, the raw/normalized mapping, the listing
//! pipeline, watch links and the session that applies mutations.

pub mod model;
pub mod pipeline;
pub mod session;
pub mod snapshot;
pub mod watch_links;

pub use model::{
    Item, ItemMetadata, MediaType, SearchHit, Settings, Vault, VaultPath, VaultSelector, WatchSite,
};
pub use pipeline::SortKey;
pub use session::{VaultSession, validate_rating};
pub use watch_links::{WatchLink, links_for};
