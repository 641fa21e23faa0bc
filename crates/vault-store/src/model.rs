//! Row types returned by the store.

use serde::{Deserialize, Serialize};
use vault_common::Provider;

/// Lifecycle state of an [`IngestionRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Complete,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Complete => "complete",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = vault_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "complete" => Ok(RunStatus::Complete),
            "failed" => Ok(RunStatus::Failed),
            other => Err(vault_common::Error::Unknown(format!(
                "unknown run status: {other}"
            ))),
        }
    }
}

/// One import attempt, the audit unit of the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionRun {
    pub id: i64,
    pub provider: Provider,
    pub status: RunStatus,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub source_label: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
}

/// The outcome of a `store_raw_artifact` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactWrite {
    pub id: i64,
    pub skipped: bool,
}

/// One byte-identical file ever ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArtifact {
    pub id: i64,
    pub run_id: i64,
    pub parent_artifact_id: Option<i64>,
    pub provider: Provider,
    pub artifact_type: String,
    pub basename: String,
    pub path_in_container: Option<String>,
    pub byte_size: i64,
    pub sha256: String,
    pub stored_path: String,
    pub imported_at: i64,
}

/// A search hit: a matched message joined with its thread and provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub message_id: i64,
    pub thread_id: i64,
    pub content: String,
    pub role: String,
    pub timestamp: Option<i64>,
    pub thread_title: String,
    pub provider: String,
}

/// The outcome of one parser invocation, reported for logging and for the
/// smoke report's counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub threads_inserted: u64,
    pub messages_inserted: u64,
}

impl ParseOutcome {
    pub fn merge(mut self, other: ParseOutcome) -> ParseOutcome {
        self.threads_inserted += other.threads_inserted;
        self.messages_inserted += other.messages_inserted;
        self
    }
}
