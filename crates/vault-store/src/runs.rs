//! Ingestion run lifecycle: created `running`, transitions exactly once to
//! `complete` or `failed`, never mutated afterward.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use vault_common::{Provider, Result};

use crate::model::{IngestionRun, RunStatus};

/// Opens a new run in `running` status.
pub fn create_ingestion_run(
    conn: &Connection,
    provider: Provider,
    source_label: Option<&str>,
) -> Result<IngestionRun> {
    let started_at = Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO ingestion_runs (provider, status, started_at, source_label)
         VALUES (?1, ?2, ?3, ?4)",
        params![provider.as_str(), RunStatus::Running.as_str(), started_at, source_label],
    )?;
    let id = conn.last_insert_rowid();
    Ok(IngestionRun {
        id,
        provider,
        status: RunStatus::Running,
        started_at,
        completed_at: None,
        source_label: source_label.map(str::to_string),
        error_message: None,
        error_code: None,
    })
}

/// Transitions a run to `complete` or `failed`. This is a one-way
/// transition: the caller is expected to call this exactly once per run.
/// `error_code` carries the stable wire code (see `vault_common::ErrorCode`)
/// alongside the raw message, so the diagnostics RPC can surface a mapped
/// code rather than pattern-matching on `Display` text.
pub fn finalize_ingestion_run(
    conn: &Connection,
    run_id: i64,
    status: RunStatus,
    error_message: Option<&str>,
    error_code: Option<&str>,
) -> Result<()> {
    let completed_at = Utc::now().timestamp_millis();
    conn.execute(
        "UPDATE ingestion_runs SET status = ?1, completed_at = ?2, error_message = ?3, error_code = ?4 WHERE id = ?5",
        params![status.as_str(), completed_at, error_message, error_code, run_id],
    )?;
    Ok(())
}

/// Fetches a single run by id, for diagnostics and tests.
pub fn get_ingestion_run(conn: &Connection, run_id: i64) -> Result<Option<IngestionRun>> {
    conn.query_row(
        "SELECT id, provider, status, started_at, completed_at, source_label, error_message, error_code
         FROM ingestion_runs WHERE id = ?1",
        params![run_id],
        |row| {
            let provider_str: String = row.get(1)?;
            let status_str: String = row.get(2)?;
            Ok(IngestionRun {
                id: row.get(0)?,
                provider: provider_str.parse().unwrap_or(vault_common::Provider::Chatgpt),
                status: status_str.parse().unwrap_or(RunStatus::Failed),
                started_at: row.get(3)?,
                completed_at: row.get(4)?,
                source_label: row.get(5)?,
                error_message: row.get(6)?,
                error_code: row.get(7)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}
