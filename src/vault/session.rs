//! An opened vault: the mapped snapshot plus the handle used to write it back.
//!
//! Every mutation is applied to the local mirror first, then written to the store.
//! A failed write restores the mirror before the error is returned.

use tracing::{debug, info, warn};

use super::model::{Item, ItemMetadata, MediaType, Vault, VaultPath, VaultSelector};
use super::pipeline::{self, SortKey};
use super::snapshot::{item_create, item_from_create, normalize};
use crate::db::{DbActorHandle, ItemFieldPatch, ItemPatch};
use crate::error::ViewVaultError;

pub const MAX_RATING: f32 = 10.0;

/// Accepts ratings in `0..=10`.
pub fn validate_rating(rating: f32) -> Result<f32, ViewVaultError> {
    if rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(ViewVaultError::invalid(format!(
            "rating {rating} is outside 0..={MAX_RATING}"
        )))
    }
}

pub struct VaultSession {
    db: DbActorHandle,
    vault: Vault,
    path: VaultPath,
    items: Vec<Item>,
}

impl VaultSession {
    /// Resolves `selector` for `uid` and reads the full snapshot.
    /// A default vault is created on first use.
    pub async fn open(
        db: DbActorHandle,
        uid: &str,
        selector: VaultSelector,
    ) -> Result<Self, ViewVaultError> {
        let row = match selector {
            VaultSelector::Default(media_type) => db.ensure_default_vault(uid, media_type).await?,
            VaultSelector::Custom(id) => db
                .get_vault(uid, id)
                .await?
                .ok_or_else(|| ViewVaultError::VaultNotFound(id.to_string()))?,
        };
        let vault = Vault::try_from(row)?;
        let path = VaultPath::of(&vault);
        let snapshot = db.load_snapshot(vault.media_type, vault.id).await?;
        debug!(path = %path, items = snapshot.len(), "vault snapshot loaded");

        Ok(Self {
            db,
            vault,
            path,
            items: normalize(snapshot),
        })
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn path(&self) -> &VaultPath {
        &self.path
    }

    pub fn media_type(&self) -> MediaType {
        self.vault.media_type
    }

    /// Items in snapshot order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, item_id: i64) -> Result<&Item, ViewVaultError> {
        self.items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or(ViewVaultError::ItemNotFound(item_id))
    }

    fn position(&self, item_id: i64) -> Result<usize, ViewVaultError> {
        self.items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(ViewVaultError::ItemNotFound(item_id))
    }

    pub fn contains_external(&self, external_id: u64) -> bool {
        self.items.iter().any(|i| i.external_id == external_id)
    }

    pub fn view(&self, providers: &[String], sort: SortKey) -> Vec<Item> {
        pipeline::apply(&self.items, providers, sort)
    }

    async fn write(&self, item_id: i64, patch: ItemFieldPatch) -> Result<(), ViewVaultError> {
        self.db
            .patch_item(ItemPatch {
                media_type: self.vault.media_type,
                vault_id: self.vault.id,
                id: item_id,
                patch,
            })
            .await
    }

    pub async fn toggle_watched(&mut self, item_id: i64) -> Result<&Item, ViewVaultError> {
        let idx = self.position(item_id)?;
        let watched = !self.items[idx].watched;
        self.items[idx].watched = watched;

        let patch = ItemFieldPatch {
            watched: Some(watched),
            ..Default::default()
        };
        if let Err(e) = self.write(item_id, patch).await {
            self.items[idx].watched = !watched;
            warn!(path = %self.path, item_id, error = %e, "toggle watched failed; rolled back");
            return Err(e);
        }
        Ok(&self.items[idx])
    }

    /// Sets or clears (`None`) the user rating.
    pub async fn set_rating(
        &mut self,
        item_id: i64,
        rating: Option<f32>,
    ) -> Result<&Item, ViewVaultError> {
        let rating = rating.map(validate_rating).transpose()?;
        let idx = self.position(item_id)?;
        let previous = std::mem::replace(&mut self.items[idx].user_rating, rating);

        let patch = ItemFieldPatch {
            userrating: Some(rating.map(f64::from)),
            ..Default::default()
        };
        if let Err(e) = self.write(item_id, patch).await {
            self.items[idx].user_rating = previous;
            warn!(path = %self.path, item_id, error = %e, "set rating failed; rolled back");
            return Err(e);
        }
        Ok(&self.items[idx])
    }

    pub async fn delete(&mut self, item_id: i64) -> Result<Item, ViewVaultError> {
        let idx = self.position(item_id)?;
        let removed = self.items.remove(idx);

        if let Err(e) = self
            .db
            .delete_item(self.vault.media_type, self.vault.id, item_id)
            .await
        {
            self.items.insert(idx, removed);
            warn!(path = %self.path, item_id, error = %e, "delete failed; rolled back");
            return Err(e);
        }
        info!(path = %self.path, item_id, title = %removed.title, "item deleted");
        Ok(removed)
    }

    /// Removes every item of this vault; returns how many the store removed.
    pub async fn clear(&mut self) -> Result<u64, ViewVaultError> {
        let previous = std::mem::take(&mut self.items);

        match self.db.clear_vault(self.vault.media_type, self.vault.id).await {
            Ok(removed) => {
                info!(path = %self.path, removed, "vault cleared");
                Ok(removed)
            }
            Err(e) => {
                self.items = previous;
                warn!(path = %self.path, error = %e, "clear failed; rolled back");
                Err(e)
            }
        }
    }

    /// Inserts a new item built from `meta`.
    /// Returns `None` when the vault already holds that external id.
    pub async fn insert(
        &mut self,
        meta: &ItemMetadata,
        watched: bool,
        user_rating: Option<f32>,
    ) -> Result<Option<&Item>, ViewVaultError> {
        let user_rating = user_rating.map(validate_rating).transpose()?;
        if self.contains_external(meta.external_id) {
            return Ok(None);
        }

        let create = item_create(self.vault.media_type, self.vault.id, meta, watched, user_rating);
        let Some(id) = self.db.insert_item(create.clone()).await? else {
            debug!(path = %self.path, external_id = meta.external_id, "item already stored");
            return Ok(None);
        };

        self.items.push(item_from_create(id, create));
        info!(path = %self.path, item_id = id, title = %meta.title, "item added");
        Ok(self.items.last())
    }

    /// Overwrites the refreshable metadata of an item: providers, age rating,
    /// vote average, runtime or episode count, poster and imdb id.
    /// Fields missing from `meta` keep their stored value.
    pub async fn apply_metadata(
        &mut self,
        item_id: i64,
        meta: &ItemMetadata,
    ) -> Result<(), ViewVaultError> {
        let idx = self.position(item_id)?;
        let previous = self.items[idx].clone();
        let media_type = self.vault.media_type;

        let item = &mut self.items[idx];
        if let Some(providers) = &meta.providers {
            item.providers.clone_from(providers);
        }
        if meta.age_rating.is_some() {
            item.age_rating.clone_from(&meta.age_rating);
        }
        if meta.vote_average.is_some() {
            item.vote_average = meta.vote_average;
        }
        if meta.length.is_some() {
            match media_type {
                MediaType::Movies => item.runtime = meta.length,
                MediaType::Tvshows => item.episode_count = meta.length,
            }
        }
        if meta.poster_path.is_some() {
            item.poster_path.clone_from(&meta.poster_path);
        }
        if meta.imdb_id.is_some() {
            item.imdb_id.clone_from(&meta.imdb_id);
        }

        let patch = ItemFieldPatch {
            length: meta.length.map(i64::from),
            providers: meta.providers.clone(),
            agerating: meta.age_rating.clone(),
            voteaverage: meta.vote_average,
            posterpath: meta.poster_path.clone(),
            imdbid: meta.imdb_id.clone(),
            ..Default::default()
        };
        if let Err(e) = self.write(item_id, patch).await {
            self.items[idx] = previous;
            warn!(path = %self.path, item_id, error = %e, "metadata write failed; rolled back");
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validate_rating;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(10.0).is_ok());
        assert!(validate_rating(7.5).is_ok());
        assert!(validate_rating(-0.5).is_err());
        assert!(validate_rating(10.1).is_err());
        assert!(validate_rating(f32::NAN).is_err());
    }
}
