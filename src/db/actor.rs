use crate::db::models::{DbMovie, DbSettings, DbShow, DbVault, Snapshot};
use crate::db::patch::{DbPatchable, ItemCreate, ItemPatch, SettingsUpsert, VaultCreate};
use crate::db::schema::SQLITE_INIT;
use crate::error::ViewVaultError;
use crate::vault::MediaType;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

const VAULT_COLUMNS: &str = "id, uid, name, media_type, is_default, created_at";

const MOVIE_COLUMNS: &str = "id, vault_id, tmdbid, movietitle, watched, userrating, runtime, \
     providers, agerating, voteaverage, genres, releasedate, posterpath, imdbid, created_at, updated_at";

const SHOW_COLUMNS: &str = "id, vault_id, tmdbid, showtitle, watched, userrating, episodes, \
     providers, agerating, voteaverage, genres, firstairdate, posterpath, imdbid, created_at, updated_at";

#[derive(Debug)]
pub enum DbActorMessage {
    /// Return the user's default vault of a media type, creating it on first use.
    EnsureDefaultVault(
        String,
        MediaType,
        RpcReplyPort<Result<DbVault, ViewVaultError>>,
    ),

    /// Create a custom vault.
    CreateVault(VaultCreate, RpcReplyPort<Result<DbVault, ViewVaultError>>),

    /// List a user's vaults, optionally restricted to one media type.
    ListVaults(
        String,
        Option<MediaType>,
        RpcReplyPort<Result<Vec<DbVault>, ViewVaultError>>,
    ),

    /// Get one vault owned by the user.
    GetVault(String, i64, RpcReplyPort<Result<Option<DbVault>, ViewVaultError>>),

    /// Delete a custom vault and all of its items.
    DeleteVault(String, i64, RpcReplyPort<Result<(), ViewVaultError>>),

    /// Read every item of a vault in insertion order.
    LoadSnapshot(
        MediaType,
        i64,
        RpcReplyPort<Result<Snapshot, ViewVaultError>>,
    ),

    /// Insert an item; `None` when the vault already holds that external id.
    InsertItem(ItemCreate, RpcReplyPort<Result<Option<i64>, ViewVaultError>>),

    /// Field-level write against one item.
    PatchItem(ItemPatch, RpcReplyPort<Result<(), ViewVaultError>>),

    /// Remove one item: (media type, vault id, item id).
    DeleteItem(MediaType, i64, i64, RpcReplyPort<Result<(), ViewVaultError>>),

    /// Remove every item of a vault; replies with the removed count.
    ClearVault(MediaType, i64, RpcReplyPort<Result<u64, ViewVaultError>>),

    GetSettings(
        String,
        MediaType,
        RpcReplyPort<Result<Option<DbSettings>, ViewVaultError>>,
    ),

    PutSettings(SettingsUpsert, RpcReplyPort<Result<(), ViewVaultError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

fn rpc_error(op: &str, e: impl std::fmt::Display) -> ViewVaultError {
    ViewVaultError::RactorError(format!("DbActor {op} RPC failed: {e}"))
}

impl DbActorHandle {
    pub async fn ensure_default_vault(
        &self,
        uid: &str,
        media_type: MediaType,
    ) -> Result<DbVault, ViewVaultError> {
        ractor::call!(
            self.actor,
            DbActorMessage::EnsureDefaultVault,
            uid.to_string(),
            media_type
        )
        .map_err(|e| rpc_error("EnsureDefaultVault", e))?
    }

    pub async fn create_vault(&self, create: VaultCreate) -> Result<DbVault, ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::CreateVault, create)
            .map_err(|e| rpc_error("CreateVault", e))?
    }

    pub async fn list_vaults(
        &self,
        uid: &str,
        media_type: Option<MediaType>,
    ) -> Result<Vec<DbVault>, ViewVaultError> {
        ractor::call!(
            self.actor,
            DbActorMessage::ListVaults,
            uid.to_string(),
            media_type
        )
        .map_err(|e| rpc_error("ListVaults", e))?
    }

    pub async fn get_vault(&self, uid: &str, id: i64) -> Result<Option<DbVault>, ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::GetVault, uid.to_string(), id)
            .map_err(|e| rpc_error("GetVault", e))?
    }

    pub async fn delete_vault(&self, uid: &str, id: i64) -> Result<(), ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::DeleteVault, uid.to_string(), id)
            .map_err(|e| rpc_error("DeleteVault", e))?
    }

    pub async fn load_snapshot(
        &self,
        media_type: MediaType,
        vault_id: i64,
    ) -> Result<Snapshot, ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::LoadSnapshot, media_type, vault_id)
            .map_err(|e| rpc_error("LoadSnapshot", e))?
    }

    pub async fn insert_item(&self, create: ItemCreate) -> Result<Option<i64>, ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::InsertItem, create)
            .map_err(|e| rpc_error("InsertItem", e))?
    }

    pub async fn patch_item(&self, patch: ItemPatch) -> Result<(), ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::PatchItem, patch)
            .map_err(|e| rpc_error("PatchItem", e))?
    }

    pub async fn delete_item(
        &self,
        media_type: MediaType,
        vault_id: i64,
        id: i64,
    ) -> Result<(), ViewVaultError> {
        ractor::call!(
            self.actor,
            DbActorMessage::DeleteItem,
            media_type,
            vault_id,
            id
        )
        .map_err(|e| rpc_error("DeleteItem", e))?
    }

    pub async fn clear_vault(
        &self,
        media_type: MediaType,
        vault_id: i64,
    ) -> Result<u64, ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::ClearVault, media_type, vault_id)
            .map_err(|e| rpc_error("ClearVault", e))?
    }

    pub async fn get_settings(
        &self,
        uid: &str,
        media_type: MediaType,
    ) -> Result<Option<DbSettings>, ViewVaultError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetSettings,
            uid.to_string(),
            media_type
        )
        .map_err(|e| rpc_error("GetSettings", e))?
    }

    pub async fn put_settings(&self, upsert: SettingsUpsert) -> Result<(), ViewVaultError> {
        ractor::call!(self.actor, DbActorMessage::PutSettings, upsert)
            .map_err(|e| rpc_error("PutSettings", e))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::EnsureDefaultVault(uid, media_type, reply) => {
                let _ = reply.send(self.ensure_default_vault(pool, &uid, media_type).await);
            }
            DbActorMessage::CreateVault(create, reply) => {
                let _ = reply.send(self.create_vault(pool, create).await);
            }
            DbActorMessage::ListVaults(uid, media_type, reply) => {
                let _ = reply.send(self.list_vaults(pool, &uid, media_type).await);
            }
            DbActorMessage::GetVault(uid, id, reply) => {
                let _ = reply.send(self.get_vault(pool, &uid, id).await);
            }
            DbActorMessage::DeleteVault(uid, id, reply) => {
                let _ = reply.send(self.delete_vault(pool, &uid, id).await);
            }
            DbActorMessage::LoadSnapshot(media_type, vault_id, reply) => {
                let _ = reply.send(self.load_snapshot(pool, media_type, vault_id).await);
            }
            DbActorMessage::InsertItem(create, reply) => {
                let _ = reply.send(self.insert_item(pool, create).await);
            }
            DbActorMessage::PatchItem(patch, reply) => {
                let _ = reply.send(patch.apply_patch(pool).await);
            }
            DbActorMessage::DeleteItem(media_type, vault_id, id, reply) => {
                let _ = reply.send(self.delete_item(pool, media_type, vault_id, id).await);
            }
            DbActorMessage::ClearVault(media_type, vault_id, reply) => {
                let _ = reply.send(self.clear_vault(pool, media_type, vault_id).await);
            }
            DbActorMessage::GetSettings(uid, media_type, reply) => {
                let _ = reply.send(self.get_settings(pool, &uid, media_type).await);
            }
            DbActorMessage::PutSettings(upsert, reply) => {
                let _ = reply.send(self.put_settings(pool, upsert).await);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn ensure_default_vault(
        &self,
        pool: &SqlitePool,
        uid: &str,
        media_type: MediaType,
    ) -> Result<DbVault, ViewVaultError> {
        // Writes are serialized through this actor, so the NOT EXISTS check cannot race.
        let inserted = sqlx::query(
            r#"
            INSERT INTO vaults (uid, name, media_type, is_default, created_at)
            SELECT ?, ?, ?, 1, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM vaults WHERE uid = ? AND media_type = ? AND is_default = 1
            )
            "#,
        )
        .bind(uid)
        .bind(media_type.default_vault_name())
        .bind(media_type.as_str())
        .bind(Utc::now())
        .bind(uid)
        .bind(media_type.as_str())
        .execute(pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            info!(uid, media_type = %media_type, "default vault created");
        }

        let row = sqlx::query_as::<_, DbVault>(&format!(
            "SELECT {VAULT_COLUMNS} FROM vaults WHERE uid = ? AND media_type = ? AND is_default = 1"
        ))
        .bind(uid)
        .bind(media_type.as_str())
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn create_vault(
        &self,
        pool: &SqlitePool,
        create: VaultCreate,
    ) -> Result<DbVault, ViewVaultError> {
        let row = sqlx::query_as::<_, DbVault>(&format!(
            r#"
            INSERT INTO vaults (uid, name, media_type, is_default, created_at)
            VALUES (?, ?, ?, 0, ?)
            RETURNING {VAULT_COLUMNS}
            "#
        ))
        .bind(create.uid)
        .bind(create.name)
        .bind(create.media_type.as_str())
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        info!(uid = %row.uid, id = row.id, media_type = %row.media_type, "custom vault created");
        Ok(row)
    }

    async fn list_vaults(
        &self,
        pool: &SqlitePool,
        uid: &str,
        media_type: Option<MediaType>,
    ) -> Result<Vec<DbVault>, ViewVaultError> {
        let rows = sqlx::query_as::<_, DbVault>(&format!(
            r#"
            SELECT {VAULT_COLUMNS}
            FROM vaults
            WHERE uid = ? AND (? IS NULL OR media_type = ?)
            ORDER BY media_type, is_default DESC, id
            "#
        ))
        .bind(uid)
        .bind(media_type.map(MediaType::as_str))
        .bind(media_type.map(MediaType::as_str))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn get_vault(
        &self,
        pool: &SqlitePool,
        uid: &str,
        id: i64,
    ) -> Result<Option<DbVault>, ViewVaultError> {
        let row = sqlx::query_as::<_, DbVault>(&format!(
            "SELECT {VAULT_COLUMNS} FROM vaults WHERE uid = ? AND id = ?"
        ))
        .bind(uid)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn delete_vault(
        &self,
        pool: &SqlitePool,
        uid: &str,
        id: i64,
    ) -> Result<(), ViewVaultError> {
        let mut tx = pool.begin().await?;

        let vault = sqlx::query_as::<_, DbVault>(&format!(
            "SELECT {VAULT_COLUMNS} FROM vaults WHERE uid = ? AND id = ?"
        ))
        .bind(uid)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ViewVaultError::VaultNotFound(format!("users/{uid}/vaults/{id}")))?;

        if vault.is_default {
            return Err(ViewVaultError::invalid("the default vault cannot be deleted"));
        }

        let mut removed = 0;
        for media_type in MediaType::ALL {
            removed += sqlx::query(&format!(
                "DELETE FROM {} WHERE vault_id = ?",
                media_type.table()
            ))
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        sqlx::query("DELETE FROM vaults WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(uid, id, removed, "custom vault deleted");
        Ok(())
    }

    async fn load_snapshot(
        &self,
        pool: &SqlitePool,
        media_type: MediaType,
        vault_id: i64,
    ) -> Result<Snapshot, ViewVaultError> {
        let snapshot = match media_type {
            MediaType::Movies => Snapshot::Movies(
                sqlx::query_as::<_, DbMovie>(&format!(
                    "SELECT {MOVIE_COLUMNS} FROM movies WHERE vault_id = ? ORDER BY id"
                ))
                .bind(vault_id)
                .fetch_all(pool)
                .await?,
            ),
            MediaType::Tvshows => Snapshot::Shows(
                sqlx::query_as::<_, DbShow>(&format!(
                    "SELECT {SHOW_COLUMNS} FROM tvshows WHERE vault_id = ? ORDER BY id"
                ))
                .bind(vault_id)
                .fetch_all(pool)
                .await?,
            ),
        };
        debug!(vault_id, media_type = %media_type, rows = snapshot.len(), "snapshot loaded");
        Ok(snapshot)
    }

    async fn insert_item(
        &self,
        pool: &SqlitePool,
        create: ItemCreate,
    ) -> Result<Option<i64>, ViewVaultError> {
        let now = Utc::now();
        let id: Option<i64> = match create {
            ItemCreate::Movie(c) => {
                sqlx::query_scalar(
                    r#"
                INSERT INTO movies (
                    vault_id, tmdbid, movietitle, watched, userrating, runtime, providers,
                    agerating, voteaverage, genres, releasedate, posterpath, imdbid, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(vault_id, tmdbid) DO NOTHING
                RETURNING id
                "#,
                )
                .bind(c.vault_id)
                .bind(c.tmdbid)
                .bind(c.movietitle)
                .bind(c.watched)
                .bind(c.userrating)
                .bind(c.runtime)
                .bind(serde_json::to_string(&c.providers)?)
                .bind(c.agerating)
                .bind(c.voteaverage)
                .bind(serde_json::to_string(&c.genres)?)
                .bind(c.releasedate)
                .bind(c.posterpath)
                .bind(c.imdbid)
                .bind(now)
                .bind(now)
                .fetch_optional(pool)
                .await?
            }

            ItemCreate::Show(c) => {
                sqlx::query_scalar(
                    r#"
                INSERT INTO tvshows (
                    vault_id, tmdbid, showtitle, watched, userrating, episodes, providers,
                    agerating, voteaverage, genres, firstairdate, posterpath, imdbid, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(vault_id, tmdbid) DO NOTHING
                RETURNING id
                "#,
                )
                .bind(c.vault_id)
                .bind(c.tmdbid)
                .bind(c.showtitle)
                .bind(c.watched)
                .bind(c.userrating)
                .bind(c.episodes)
                .bind(serde_json::to_string(&c.providers)?)
                .bind(c.agerating)
                .bind(c.voteaverage)
                .bind(serde_json::to_string(&c.genres)?)
                .bind(c.firstairdate)
                .bind(c.posterpath)
                .bind(c.imdbid)
                .bind(now)
                .bind(now)
                .fetch_optional(pool)
                .await?
            }
        };

        Ok(id)
    }

    async fn delete_item(
        &self,
        pool: &SqlitePool,
        media_type: MediaType,
        vault_id: i64,
        id: i64,
    ) -> Result<(), ViewVaultError> {
        let affected = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = ? AND vault_id = ?",
            media_type.table()
        ))
        .bind(id)
        .bind(vault_id)
        .execute(pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(ViewVaultError::ItemNotFound(id));
        }
        Ok(())
    }

    async fn clear_vault(
        &self,
        pool: &SqlitePool,
        media_type: MediaType,
        vault_id: i64,
    ) -> Result<u64, ViewVaultError> {
        let mut tx = pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM vaults WHERE id = ? AND media_type = ?")
                .bind(vault_id)
                .bind(media_type.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(ViewVaultError::VaultNotFound(vault_id.to_string()));
        }

        let removed = sqlx::query(&format!(
            "DELETE FROM {} WHERE vault_id = ?",
            media_type.table()
        ))
        .bind(vault_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(removed)
    }

    async fn get_settings(
        &self,
        pool: &SqlitePool,
        uid: &str,
        media_type: MediaType,
    ) -> Result<Option<DbSettings>, ViewVaultError> {
        let row = sqlx::query_as::<_, DbSettings>(
            r#"
        SELECT uid, media_type, providers, watch_sites, updated_at
        FROM settings
        WHERE uid = ? AND media_type = ?
        "#,
        )
        .bind(uid)
        .bind(media_type.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn put_settings(
        &self,
        pool: &SqlitePool,
        upsert: SettingsUpsert,
    ) -> Result<(), ViewVaultError> {
        sqlx::query(
            r#"
            INSERT INTO settings (uid, media_type, providers, watch_sites, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(uid, media_type) DO UPDATE SET
                providers = excluded.providers,
                watch_sites = excluded.watch_sites,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(upsert.uid)
        .bind(upsert.media_type.as_str())
        .bind(serde_json::to_string(&upsert.providers)?)
        .bind(serde_json::to_string(&upsert.watch_sites)?)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(
        Some(format!("DbActor:{database_url}")),
        DbActor,
        database_url.to_string(),
    )
    .await
    .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), ViewVaultError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
