//! Connection bootstrap: pragmas, then migration to the latest schema.

use std::path::Path;

use rusqlite::Connection;
use vault_common::Result;

use crate::migrations::{migrate, MigrateOptions};

/// Opens (creating if absent) the database at `path`, applies the standard
/// pragmas, and migrates to the latest schema.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(path)?;
    apply_pragmas(&mut conn)?;
    migrate(&mut conn, None)?;
    Ok(conn)
}

/// Opens a database and migrates it using caller-supplied options, for
/// tests that need to inject a partial migration list or target version.
pub fn open_with_options(path: &Path, options: MigrateOptions) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(path)?;
    apply_pragmas(&mut conn)?;
    migrate(&mut conn, Some(options))?;
    Ok(conn)
}

fn apply_pragmas(conn: &mut Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(())
}
