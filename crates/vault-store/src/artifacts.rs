//! Content-addressed artifact persistence.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use vault_common::{util, Provider, Result};

use crate::model::{ArtifactWrite, RawArtifact};

/// Writes `bytes` to the content-addressed artifact store under
/// `artifacts_dir` and records a row for them, unless an artifact with the
/// same SHA-256 already exists.
///
/// On a second call with identical bytes, the existing row is returned
/// unchanged (`skipped = true`) without touching disk. If the filesystem
/// write fails the row is never inserted. `artifacts_dir` is always the
/// directory resolved once by `PathRoot`; threading it explicitly here
/// (rather than reading the global singleton mid-function) keeps the Store
/// testable in isolation from process-wide state.
#[allow(clippy::too_many_arguments)]
pub fn store_raw_artifact(
    conn: &Connection,
    artifacts_dir: &Path,
    run_id: i64,
    provider: Provider,
    artifact_type: &str,
    filename: &str,
    bytes: &[u8],
    parent_artifact_id: Option<i64>,
    path_in_container: Option<&str>,
) -> Result<ArtifactWrite> {
    let sha = util::sha256_hex(bytes);

    if let Some(existing_id) = find_by_sha(conn, &sha)? {
        debug!(sha256 = %sha, id = existing_id, "artifact already present, skipping write");
        return Ok(ArtifactWrite {
            id: existing_id,
            skipped: true,
        });
    }

    let safe_name = util::sanitize_basename(filename);
    let stored_path = artifacts_dir.join(format!("{sha}-{safe_name}"));
    std::fs::write(&stored_path, bytes)?;

    let imported_at = Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO raw_artifacts
            (run_id, parent_artifact_id, provider, artifact_type, basename,
             path_in_container, byte_size, sha256, stored_path, imported_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            run_id,
            parent_artifact_id,
            provider.as_str(),
            artifact_type,
            safe_name,
            path_in_container,
            bytes.len() as i64,
            sha,
            stored_path.to_string_lossy(),
            imported_at,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(sha256 = %sha, id, bytes = bytes.len(), "stored new artifact");

    Ok(ArtifactWrite { id, skipped: false })
}

fn find_by_sha(conn: &Connection, sha: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM raw_artifacts WHERE sha256 = ?1",
        params![sha],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Fetches a single artifact row, used by tests and diagnostics.
pub fn get_raw_artifact(conn: &Connection, id: i64) -> Result<Option<RawArtifact>> {
    conn.query_row(
        "SELECT id, run_id, parent_artifact_id, provider, artifact_type, basename,
                path_in_container, byte_size, sha256, stored_path, imported_at
         FROM raw_artifacts WHERE id = ?1",
        params![id],
        |row| {
            let provider_str: String = row.get(3)?;
            Ok(RawArtifact {
                id: row.get(0)?,
                run_id: row.get(1)?,
                parent_artifact_id: row.get(2)?,
                provider: provider_str.parse().unwrap_or(Provider::Chatgpt),
                artifact_type: row.get(4)?,
                basename: row.get(5)?,
                path_in_container: row.get(6)?,
                byte_size: row.get(7)?,
                sha256: row.get(8)?,
                stored_path: row.get(9)?,
                imported_at: row.get(10)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::runs::create_ingestion_run;

    fn setup() -> (rusqlite::Connection, tempfile::TempDir, i64) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("artifacts")).unwrap();
        let conn = db::open(&dir.path().join("vault.db")).unwrap();
        let run = create_ingestion_run(&conn, Provider::Chatgpt, None).unwrap();
        (conn, dir, run.id)
    }

    #[test]
    fn dedup_returns_same_id_and_skips_second_write() {
        let (conn, dir, run_id) = setup();
        let artifacts_dir = dir.path().join("artifacts");
        let bytes = b"{\"hello\":\"world\"}";

        let first = store_raw_artifact(
            &conn,
            &artifacts_dir,
            run_id,
            Provider::Chatgpt,
            "json",
            "x.json",
            bytes,
            None,
            None,
        )
        .unwrap();
        assert!(!first.skipped);

        let second = store_raw_artifact(
            &conn,
            &artifacts_dir,
            run_id,
            Provider::Chatgpt,
            "json",
            "x.json",
            bytes,
            None,
            None,
        )
        .unwrap();
        assert!(second.skipped);
        assert_eq!(first.id, second.id);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM raw_artifacts", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let files: Vec<_> = std::fs::read_dir(&artifacts_dir).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn sanitizes_directory_components_from_filename() {
        let (conn, dir, run_id) = setup();
        let artifacts_dir = dir.path().join("artifacts");
        let outcome = store_raw_artifact(
            &conn,
            &artifacts_dir,
            run_id,
            Provider::Chatgpt,
            "json",
            "../../etc/passwd.json",
            b"{}",
            None,
            None,
        )
        .unwrap();

        let row = get_raw_artifact(&conn, outcome.id).unwrap().unwrap();
        assert_eq!(row.basename, "passwd.json");
        let stored = std::path::Path::new(&row.stored_path);
        assert!(stored.starts_with(&artifacts_dir));
    }

    #[test]
    fn stored_file_hashes_to_recorded_sha256() {
        let (conn, dir, run_id) = setup();
        let artifacts_dir = dir.path().join("artifacts");
        let bytes = b"sentinel content";
        let outcome = store_raw_artifact(
            &conn,
            &artifacts_dir,
            run_id,
            Provider::Claude,
            "json",
            "conv.json",
            bytes,
            None,
            None,
        )
        .unwrap();

        let row = get_raw_artifact(&conn, outcome.id).unwrap().unwrap();
        let on_disk = std::fs::read(&row.stored_path).unwrap();
        assert_eq!(util::sha256_hex(&on_disk), row.sha256);
    }
}
