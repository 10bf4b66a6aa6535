pub mod guards;
pub mod router;
pub mod routes;

pub use router::{ViewVaultState, viewvault_router};
