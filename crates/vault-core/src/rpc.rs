//! The RPC surface consumed by the host shell: `status`, `search`,
//! `importHeadless`, `wipe`, `diagnostics`. `importFile` (the file-picker
//! variant) is a thin stub here since the picker itself is host-shell UI,
//! out of scope for this core.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;
use serde::Serialize;
use vault_common::{Provider, Result};
use vault_paths::PathRoot;
use vault_store::{Hit, IngestionRun};

use crate::controller::{self, ImportOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub local_only: bool,
    pub vault_path: String,
}

/// `status() -> {status: "secure", localOnly: true, vaultPath}`
pub fn status(root: &PathRoot) -> StatusResponse {
    StatusResponse {
        status: "secure",
        local_only: true,
        vault_path: root.vault().to_string_lossy().into_owned(),
    }
}

/// `search(query) -> Hit[]`
pub fn search(root: &PathRoot, query: &str) -> Result<Vec<Hit>> {
    let conn = vault_store::open(root.db())?;
    vault_store::search(&conn, query)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImportResult {
    pub success: bool,
    pub run_id: i64,
    pub artifact_id: i64,
}

impl From<ImportOutcome> for ImportResult {
    fn from(outcome: ImportOutcome) -> Self {
        ImportResult {
            success: true,
            run_id: outcome.run_id,
            artifact_id: outcome.artifact_id,
        }
    }
}

/// `importHeadless(provider, absolutePath) -> {success, runId, artifactId}`,
/// bypassing the file picker. Used directly by the CLI and smoke driver.
pub fn import_headless(root: &PathRoot, provider: Provider, path: &Path) -> Result<ImportResult> {
    let mut conn = vault_store::open(root.db())?;
    let outcome = controller::import_headless(&mut conn, root.artifacts(), provider, path, None)?;
    Ok(outcome.into())
}

/// `importFile(provider) -> {success, runId, artifactId} | null`. The file
/// picker that supplies a path lives in the host shell; this core has no UI
/// of its own, so it always reports no selection (`null`) rather than
/// guessing a path.
pub fn import_file(_provider: Provider) -> Option<ImportResult> {
    None
}

/// `wipe() -> {success: true}` or throws.
pub fn wipe(root: &PathRoot) -> Result<()> {
    let mut conn = vault_store::open(root.db())?;
    vault_store::wipe(&mut conn, root.artifacts())
}

#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    pub version: String,
    pub is_packaged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    pub platform: String,
    pub arch: String,
    pub electron: Option<String>,
    pub node: Option<String>,
    pub os_release: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultInfo {
    pub schema_version: i64,
    pub db_size_bytes: u64,
    pub artifacts_total_bytes: i64,
    pub fts_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub provider: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub count: i64,
    pub total_bytes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionInfo {
    pub runs_summary: vault_store::diagnostics::RunsSummary,
    pub recent_runs: Vec<IngestionRun>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthInfo {
    pub sqlite_integrity_check: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub generated_at: i64,
    pub app: AppInfo,
    pub runtime: RuntimeInfo,
    pub vault: VaultInfo,
    pub ingestion: IngestionInfo,
    pub artifacts: Vec<ArtifactSummary>,
    pub health: HealthInfo,
}

/// `diagnostics() -> {...}` — privacy allowlist: every query here touches
/// only `schema_meta`, `ingestion_runs`, `raw_artifacts`. Never `messages`,
/// never `threads`, never titles, never filenames. Error tails in recent
/// runs are redacted before being returned.
pub fn diagnostics(root: &PathRoot) -> Result<Diagnostics> {
    let conn = vault_store::open(root.db())?;
    Ok(Diagnostics {
        generated_at: now_epoch_ms(),
        app: AppInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            is_packaged: false,
        },
        runtime: RuntimeInfo {
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            // This process has no Electron/Node runtime of its own; the
            // desktop-shell caller fills these in from its own process
            // before forwarding the RPC result further.
            electron: None,
            node: None,
            os_release: None,
        },
        vault: VaultInfo {
            schema_version: vault_store::diagnostics::schema_version(&conn)?,
            db_size_bytes: db_size_bytes(root.db()),
            artifacts_total_bytes: vault_store::diagnostics::artifacts_total_bytes(&conn)?,
            fts_enabled: vault_store::diagnostics::fts_enabled(&conn)?,
        },
        ingestion: IngestionInfo {
            runs_summary: vault_store::diagnostics::runs_summary(&conn)?,
            recent_runs: redact_recent_runs(vault_store::diagnostics::recent_runs(&conn, 20)?),
        },
        artifacts: vault_store::diagnostics::artifacts_by_provider_type(&conn)?
            .into_iter()
            .map(|s| ArtifactSummary {
                provider: s.provider,
                artifact_type: s.artifact_type,
                count: s.count,
                total_bytes: s.total_bytes,
            })
            .collect(),
        health: HealthInfo {
            sqlite_integrity_check: vault_store::diagnostics::sqlite_integrity_check(&conn)?,
        },
    })
}

fn redact_recent_runs(mut runs: Vec<IngestionRun>) -> Vec<IngestionRun> {
    for run in &mut runs {
        if let Some(message) = &run.error_message {
            run.error_message = Some(vault_redact::redact_paths(message));
        }
    }
    runs
}

fn db_size_bytes(db_path: &Path) -> u64 {
    std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Opens (or creates, migrating) the database at `root.db()`. Exposed for
/// callers that need a raw connection, such as the smoke driver.
pub fn open_connection(root: &PathRoot) -> Result<Connection> {
    vault_store::open(root.db())
}
