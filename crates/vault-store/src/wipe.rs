//! The two-phase vault reset: filesystem first, database second, never
//! mixed into one "transaction" abstraction so filesystem errors surface
//! before anything in the database changes.

use std::path::Path;

use rusqlite::Connection;
use tracing::{info, warn};
use vault_common::{Error, Result};

/// Deletes every artifact file under `artifacts_dir`, then truncates every
/// relational table in one transaction. If any artifact file fails to
/// delete, the whole wipe fails *before* the database is touched — the
/// disk and DB are never left inconsistent in the deleted-rows-but-orphan-
/// files direction.
pub fn wipe(conn: &mut Connection, artifacts_dir: &Path) -> Result<()> {
    let mut failures = Vec::new();

    if artifacts_dir.is_dir() {
        for entry in std::fs::read_dir(artifacts_dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    failures.push(e.to_string());
                    continue;
                }
            };
            if let Err(e) = std::fs::remove_file(entry.path()) {
                failures.push(format!("{}: {e}", entry.path().display()));
            }
        }
    }

    if !failures.is_empty() {
        warn!(count = failures.len(), "wipe aborted before touching database");
        return Err(Error::FsWriteFailed(failures.join("; ")));
    }

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM messages", [])?;
    tx.execute("DELETE FROM threads", [])?;
    tx.execute("DELETE FROM raw_artifacts", [])?;
    tx.execute("DELETE FROM ingestion_runs", [])?;
    tx.commit()?;

    info!("vault wiped");
    Ok(())
}
