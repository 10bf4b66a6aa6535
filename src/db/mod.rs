//! Database module: the document store behind every vault.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows (raw stored field names)
//! - `patch.rs`: create/patch payloads sent to the actor
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the single actor owning the pool

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

mod patch_impl;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbMovie, DbSettings, DbShow, DbVault, Snapshot};
pub use patch::{
    DbPatchable, ItemCreate, ItemFieldPatch, ItemPatch, MovieCreate, SettingsUpsert, ShowCreate,
    VaultCreate,
};
pub use schema::SQLITE_INIT;
