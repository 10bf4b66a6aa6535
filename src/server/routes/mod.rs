pub mod items;
pub mod search;
pub mod settings;
pub mod transfer;
pub mod vaults;

use crate::error::ViewVaultError;
use crate::server::router::ViewVaultState;
use crate::vault::{VaultSelector, VaultSession};

/// Opens the vault addressed by a `{uid}/vaults/{selector}` path.
pub(crate) async fn open_session(
    state: &ViewVaultState,
    uid: &str,
    selector: &str,
) -> Result<VaultSession, ViewVaultError> {
    let selector: VaultSelector = selector.parse()?;
    VaultSession::open(state.db.clone(), uid, selector).await
}
