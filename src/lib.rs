pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod tmdb;
pub mod transfer;
pub mod vault;

mod utils;

pub use error::{TmdbError, ViewVaultError};
pub use server::{ViewVaultState, viewvault_router};
pub use vault::{Item, MediaType, Vault, VaultSession};
