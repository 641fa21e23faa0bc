//! Read-only queries backing the diagnostics RPC.
//!
//! Privacy allowlist: every query here touches only `schema_meta`,
//! `ingestion_runs`, and `raw_artifacts` — never `messages`, never
//! `threads`, never titles, never filenames.

use rusqlite::{Connection, OptionalExtension};
use vault_common::Result;

use crate::migrations::current_version;
use crate::model::IngestionRun;
use crate::runs::get_ingestion_run;

/// Per-(provider, artifact type) artifact counters.
#[derive(Debug, Clone)]
pub struct ArtifactTypeSummary {
    pub provider: String,
    pub artifact_type: String,
    pub count: i64,
    pub total_bytes: i64,
}

/// Ingestion run counts grouped by status.
#[derive(Debug, Clone, Default)]
pub struct RunsSummary {
    pub total: i64,
    pub running: i64,
    pub complete: i64,
    pub failed: i64,
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    current_version(conn)
}

pub fn fts_enabled(conn: &Connection) -> Result<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'messages_fts'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

pub fn artifacts_total_bytes(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COALESCE(SUM(byte_size), 0) FROM raw_artifacts", [], |row| {
        row.get(0)
    })?)
}

pub fn artifacts_by_provider_type(conn: &Connection) -> Result<Vec<ArtifactTypeSummary>> {
    let mut stmt = conn.prepare(
        "SELECT provider, artifact_type, COUNT(*), COALESCE(SUM(byte_size), 0)
         FROM raw_artifacts GROUP BY provider, artifact_type ORDER BY provider, artifact_type",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ArtifactTypeSummary {
            provider: row.get(0)?,
            artifact_type: row.get(1)?,
            count: row.get(2)?,
            total_bytes: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn runs_summary(conn: &Connection) -> Result<RunsSummary> {
    let mut summary = RunsSummary::default();
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM ingestion_runs GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (status, count) = row?;
        summary.total += count;
        match status.as_str() {
            "running" => summary.running = count,
            "complete" => summary.complete = count,
            "failed" => summary.failed = count,
            _ => {}
        }
    }
    Ok(summary)
}

pub fn recent_runs(conn: &Connection, limit: i64) -> Result<Vec<IngestionRun>> {
    let mut stmt =
        conn.prepare("SELECT id FROM ingestion_runs ORDER BY started_at DESC LIMIT ?1")?;
    let ids = stmt.query_map([limit], |row| row.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for id in ids {
        if let Some(run) = get_ingestion_run(conn, id?)? {
            out.push(run);
        }
    }
    Ok(out)
}

/// Runs SQLite's built-in `PRAGMA integrity_check` and returns its verdict
/// verbatim (`"ok"` when healthy, otherwise the first reported violation).
pub fn sqlite_integrity_check(conn: &Connection) -> Result<String> {
    Ok(conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?)
}
