//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `vaults` table (one default vault per (uid, media_type), unlimited custom vaults)
/// - `movies` / `tvshows` tables keeping the raw field names of the original document store
/// - `settings` table (one row per (uid, media_type))
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Vaults
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS vaults (
    id INTEGER PRIMARY KEY NOT NULL,
    uid TEXT NOT NULL,
    name TEXT NOT NULL,
    media_type TEXT NOT NULL, -- movies | tvshows
    is_default INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_vaults_uid ON vaults(uid, media_type);

CREATE UNIQUE INDEX IF NOT EXISTS idx_vaults_default
    ON vaults(uid, media_type) WHERE is_default = 1;

-- ---------------------------------------------------------------------------
-- Movies (one tmdbid per vault)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY NOT NULL,
    vault_id INTEGER NOT NULL REFERENCES vaults(id) ON DELETE CASCADE,
    tmdbid INTEGER NOT NULL,
    movietitle TEXT NOT NULL,
    watched INTEGER NOT NULL DEFAULT 0,
    userrating REAL NULL,
    runtime INTEGER NULL,
    providers TEXT NOT NULL DEFAULT '[]', -- JSON array
    agerating TEXT NULL,
    voteaverage REAL NULL,
    genres TEXT NOT NULL DEFAULT '[]', -- JSON array
    releasedate TEXT NULL,
    posterpath TEXT NULL,
    imdbid TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(vault_id, tmdbid)
);

-- ---------------------------------------------------------------------------
-- TV shows (one tmdbid per vault)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tvshows (
    id INTEGER PRIMARY KEY NOT NULL,
    vault_id INTEGER NOT NULL REFERENCES vaults(id) ON DELETE CASCADE,
    tmdbid INTEGER NOT NULL,
    showtitle TEXT NOT NULL,
    watched INTEGER NOT NULL DEFAULT 0,
    userrating REAL NULL,
    episodes INTEGER NULL,
    providers TEXT NOT NULL DEFAULT '[]', -- JSON array
    agerating TEXT NULL,
    voteaverage REAL NULL,
    genres TEXT NOT NULL DEFAULT '[]', -- JSON array
    firstairdate TEXT NULL,
    posterpath TEXT NULL,
    imdbid TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(vault_id, tmdbid)
);

-- ---------------------------------------------------------------------------
-- Settings
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    uid TEXT NOT NULL,
    media_type TEXT NOT NULL,
    providers TEXT NOT NULL DEFAULT '[]', -- JSON array
    watch_sites TEXT NOT NULL DEFAULT '[]', -- JSON array of {name,url,spaceFormat}
    updated_at TEXT NOT NULL, -- RFC3339
    PRIMARY KEY(uid, media_type)
);
"#;
