//! Row insertion helpers called by parsers from inside the transaction
//! that wraps one parser invocation (see `vault-parsers`). These are the
//! only write paths into `threads` and `messages`; the Ingest Controller
//! and Store never insert these rows directly.

use rusqlite::{params, Transaction};
use vault_common::{util, Provider, Result};

/// Inserts one normalized conversation and returns its row id.
#[allow(clippy::too_many_arguments)]
pub fn insert_thread(
    tx: &Transaction,
    provider: Provider,
    provider_thread_id: Option<&str>,
    title: &str,
    created_at: Option<i64>,
    artifact_id: i64,
    run_id: i64,
) -> Result<i64> {
    tx.execute(
        "INSERT INTO threads (provider, provider_thread_id, title, created_at, artifact_id, run_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            provider.as_str(),
            provider_thread_id,
            title,
            created_at,
            artifact_id,
            run_id
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

/// Inserts one normalized message at a dense, caller-supplied `position`
/// within its thread. The content hash is computed here from the raw
/// content so every parser gets it for free.
#[allow(clippy::too_many_arguments)]
pub fn insert_message(
    tx: &Transaction,
    thread_id: i64,
    provider: Provider,
    provider_message_id: Option<&str>,
    role: &str,
    content: &str,
    content_plain: &str,
    timestamp: Option<i64>,
    position: i64,
    parent_provider_message_id: Option<&str>,
    artifact_id: i64,
    run_id: i64,
) -> Result<i64> {
    let content_hash = util::sha256_hex(content.as_bytes());
    tx.execute(
        "INSERT INTO messages
            (thread_id, provider, provider_message_id, role, content, content_plain,
             timestamp, position, parent_provider_message_id, content_hash, artifact_id, run_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            thread_id,
            provider.as_str(),
            provider_message_id,
            role,
            content,
            content_plain,
            timestamp,
            position,
            parent_provider_message_id,
            content_hash,
            artifact_id,
            run_id,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}
