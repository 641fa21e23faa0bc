//! The Migrator: ordered, transactional, idempotent schema evolution, plus
//! the FTS repair pass that runs after every migration.
//!
//! Grounded on the migration idiom used by the wider example pack's
//! embedded-sqlite crates (versioned `const` DDL scripts applied inside one
//! transaction each, tracked by a `schema_meta`/`meta` table), adapted to
//! this repo's append-only migration list plus an always-reasserted FTS
//! repair step that those examples do not need.

use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};
use vault_common::Result;

/// One schema migration: a strictly increasing version number and the DDL
/// script to apply. Scripts lean on `CREATE ... IF NOT EXISTS` so that a
/// migration is idempotent in isolation, though the surrounding
/// transaction is the real atomicity guarantee.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// The append-only, immutable list of migrations shipped with this crate.
/// New migrations are added to the end with a strictly increasing version;
/// nothing here is ever edited once released.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial schema",
    sql: r#"
CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ingestion_runs (
    id             INTEGER PRIMARY KEY,
    provider       TEXT NOT NULL,
    status         TEXT NOT NULL,
    started_at     INTEGER NOT NULL,
    completed_at   INTEGER,
    source_label   TEXT,
    error_message  TEXT,
    error_code     TEXT
);

CREATE TABLE IF NOT EXISTS raw_artifacts (
    id                  INTEGER PRIMARY KEY,
    run_id              INTEGER NOT NULL REFERENCES ingestion_runs(id),
    parent_artifact_id  INTEGER REFERENCES raw_artifacts(id),
    provider            TEXT NOT NULL,
    artifact_type       TEXT NOT NULL,
    basename            TEXT NOT NULL,
    path_in_container   TEXT,
    byte_size           INTEGER NOT NULL,
    sha256              TEXT NOT NULL UNIQUE,
    stored_path         TEXT NOT NULL,
    imported_at         INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_raw_artifacts_run ON raw_artifacts(run_id);

CREATE TABLE IF NOT EXISTS threads (
    id                  INTEGER PRIMARY KEY,
    provider            TEXT NOT NULL,
    provider_thread_id  TEXT,
    title               TEXT NOT NULL,
    created_at          INTEGER,
    artifact_id         INTEGER NOT NULL REFERENCES raw_artifacts(id),
    run_id              INTEGER NOT NULL REFERENCES ingestion_runs(id)
);

CREATE INDEX IF NOT EXISTS idx_threads_run ON threads(run_id);

CREATE TABLE IF NOT EXISTS messages (
    id                          INTEGER PRIMARY KEY,
    thread_id                   INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
    provider                    TEXT NOT NULL,
    provider_message_id         TEXT,
    role                        TEXT NOT NULL,
    content                     TEXT NOT NULL,
    content_plain               TEXT NOT NULL,
    timestamp                   INTEGER,
    position                    INTEGER NOT NULL,
    parent_provider_message_id  TEXT,
    content_hash                TEXT NOT NULL,
    artifact_id                 INTEGER NOT NULL REFERENCES raw_artifacts(id),
    run_id                      INTEGER NOT NULL REFERENCES ingestion_runs(id),
    UNIQUE(thread_id, position)
);

CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id);
CREATE INDEX IF NOT EXISTS idx_messages_run ON messages(run_id);
"#,
}];

/// Options overriding the migration list and target version, for tests.
pub struct MigrateOptions {
    pub migrations: &'static [Migration],
    pub target_version: i64,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        MigrateOptions {
            migrations: MIGRATIONS,
            target_version: MIGRATIONS.iter().map(|m| m.version).max().unwrap_or(0),
        }
    }
}

const FTS_DDL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS messages_fts USING fts5(
    content_plain,
    content='messages',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS messages_ai AFTER INSERT ON messages BEGIN
    INSERT INTO messages_fts(rowid, content_plain) VALUES (new.id, new.content_plain);
END;

CREATE TRIGGER IF NOT EXISTS messages_ad AFTER DELETE ON messages BEGIN
    INSERT INTO messages_fts(messages_fts, rowid, content_plain) VALUES ('delete', old.id, old.content_plain);
END;

CREATE TRIGGER IF NOT EXISTS messages_au AFTER UPDATE ON messages BEGIN
    INSERT INTO messages_fts(messages_fts, rowid, content_plain) VALUES ('delete', old.id, old.content_plain);
    INSERT INTO messages_fts(rowid, content_plain) VALUES (new.id, new.content_plain);
END;
"#;

/// Brings `conn` to `options.target_version`, transactionally and
/// idempotently, then re-asserts the FTS virtual table and triggers
/// regardless of migration history.
pub fn migrate(conn: &mut Connection, options: Option<MigrateOptions>) -> Result<()> {
    let options = options.unwrap_or_default();
    let current = current_version(conn)?;

    let mut pending: Vec<&Migration> = options
        .migrations
        .iter()
        .filter(|m| m.version > current && m.version <= options.target_version)
        .collect();
    pending.sort_by_key(|m| m.version);

    for migration in pending {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_meta(key, value) VALUES ('schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [migration.version.to_string()],
        )?;
        tx.commit()?;
        info!(version = migration.version, name = migration.name, "applied migration");
    }

    conn.execute_batch(FTS_DDL)?;

    let final_version = current_version(conn)?;
    conn.pragma_update(None, "user_version", final_version)?;
    Ok(())
}

/// Reads the current schema version: 0 if `schema_meta` does not exist yet.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let table_exists: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_meta'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();

    if !table_exists {
        return Ok(0);
    }

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
}

/// Drops the three FTS triggers, simulating external corruption, so tests
/// can exercise the repair pass.
pub fn drop_fts_triggers_for_test(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TRIGGER IF EXISTS messages_ai;
         DROP TRIGGER IF EXISTS messages_ad;
         DROP TRIGGER IF EXISTS messages_au;",
    )?;
    warn!("dropped FTS triggers for test repair scenario");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let mut conn = rusqlite::Connection::open(&path).unwrap();
        migrate(&mut conn, None).unwrap();
        let version_after_first = current_version(&conn).unwrap();
        let rows_after_first: i64 = conn
            .query_row("SELECT COUNT(*) FROM ingestion_runs", [], |r| r.get(0))
            .unwrap();

        migrate(&mut conn, None).unwrap();
        let version_after_second = current_version(&conn).unwrap();
        let rows_after_second: i64 = conn
            .query_row("SELECT COUNT(*) FROM ingestion_runs", [], |r| r.get(0))
            .unwrap();

        assert_eq!(version_after_first, version_after_second);
        assert_eq!(rows_after_first, rows_after_second);
    }

    #[test]
    fn fts_repair_restores_dropped_triggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let mut conn = rusqlite::Connection::open(&path).unwrap();
        migrate(&mut conn, None).unwrap();

        drop_fts_triggers_for_test(&conn).unwrap();
        let trigger_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='trigger' AND name LIKE 'messages_%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(trigger_count, 0);

        migrate(&mut conn, None).unwrap();
        let trigger_count_after: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='trigger' AND name LIKE 'messages_%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(trigger_count_after, 3);
    }

    #[test]
    fn missing_schema_meta_table_means_version_zero() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);
    }

    #[test]
    fn migration_upgrade_preserves_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let mut conn = rusqlite::Connection::open(&path).unwrap();

        let v1_only = MigrateOptions {
            migrations: MIGRATIONS,
            target_version: 1,
        };
        migrate(&mut conn, Some(v1_only)).unwrap();

        conn.execute(
            "INSERT INTO ingestion_runs (provider, status, started_at) VALUES ('chatgpt', 'complete', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO raw_artifacts (run_id, provider, artifact_type, basename, byte_size, sha256, stored_path, imported_at)
             VALUES (1, 'chatgpt', 'json', 'x.json', 2, 'abc', '/tmp/abc-x.json', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO threads (provider, title, artifact_id, run_id) VALUES ('chatgpt', 'demo', 1, 1)",
            [],
        )
        .unwrap();

        static MIGRATIONS_V2: &[Migration] = &[
            MIGRATIONS[0],
            Migration {
                version: 2,
                name: "add archived flag to threads",
                sql: "ALTER TABLE threads ADD COLUMN archived INTEGER NOT NULL DEFAULT 0;",
            },
        ];
        let v2 = MigrateOptions {
            migrations: MIGRATIONS_V2,
            target_version: 2,
        };
        migrate(&mut conn, Some(v2)).unwrap();

        let thread_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM threads", [], |r| r.get(0))
            .unwrap();
        assert_eq!(thread_count, 1);

        let archived: i64 = conn
            .query_row("SELECT archived FROM threads WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(archived, 0);
        assert_eq!(current_version(&conn).unwrap(), 2);
    }
}
