//! ItemPatch -> DbPatchable implementation.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::patch::{DbPatchable, ItemFieldPatch, ItemPatch};
use crate::error::ViewVaultError;

#[async_trait]
impl DbPatchable for ItemPatch {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<(), ViewVaultError> {
        let ItemFieldPatch {
            watched,
            userrating,
            length,
            providers,
            agerating,
            voteaverage,
            posterpath,
            imdbid,
        } = self.patch.clone();

        let table = self.media_type.table();
        let length_column = self.media_type.length_column();
        let userrating_set = userrating.is_some();
        let providers_json = providers.as_ref().map(serde_json::to_string).transpose()?;
        let updated_at = Utc::now();

        // Table and column names come from `MediaType`, never from input.
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                watched = COALESCE(?, watched),
                userrating = CASE WHEN ? THEN ? ELSE userrating END,
                {length_column} = COALESCE(?, {length_column}),
                providers = COALESCE(?, providers),
                agerating = COALESCE(?, agerating),
                voteaverage = COALESCE(?, voteaverage),
                posterpath = COALESCE(?, posterpath),
                imdbid = COALESCE(?, imdbid),
                updated_at = ?
            WHERE id = ? AND vault_id = ?
            "#
        );

        let res = sqlx::query(&sql)
            .bind(watched)
            .bind(userrating_set)
            .bind(userrating.flatten())
            .bind(length)
            .bind(providers_json)
            .bind(agerating)
            .bind(voteaverage)
            .bind(posterpath)
            .bind(imdbid)
            .bind(updated_at)
            .bind(self.id)
            .bind(self.vault_id)
            .execute(pool)
            .await?;

        let affected = res.rows_affected();
        debug!(
            table,
            id = self.id,
            vault_id = self.vault_id,
            affected,
            watched_set = watched.is_some(),
            userrating_set,
            length_set = length.is_some(),
            "db patch applied"
        );

        if affected == 0 {
            return Err(ViewVaultError::ItemNotFound(self.id));
        }

        Ok(())
    }
}
