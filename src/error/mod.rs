mod tmdb;
mod viewvault;

pub use tmdb::TmdbError;
pub use viewvault::{ApiErrorBody, ApiErrorObject, ViewVaultError};

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
