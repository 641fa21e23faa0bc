//! Full-text search: the FTS MATCH query joined with its owning thread.

use rusqlite::{params, Connection};
use vault_common::Result;

use crate::model::Hit;

/// Runs `query` against the messages FTS index and returns matched
/// messages joined with their thread and provider, ranked by FTS5's
/// built-in `rank`. `query` is passed through verbatim — the FTS grammar
/// (tokens, quoted phrases, boolean operators) is the engine's, not ours.
pub fn search(conn: &Connection, query: &str) -> Result<Vec<Hit>> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.thread_id, m.content, m.role, m.timestamp, t.title, t.provider
         FROM messages_fts f
         JOIN messages m ON f.rowid = m.id
         JOIN threads t ON m.thread_id = t.id
         WHERE messages_fts MATCH ?1
         ORDER BY rank",
    )?;

    let rows = stmt.query_map(params![query], |row| {
        Ok(Hit {
            message_id: row.get(0)?,
            thread_id: row.get(1)?,
            content: row.get(2)?,
            role: row.get(3)?,
            timestamp: row.get(4)?,
            thread_title: row.get(5)?,
            provider: row.get(6)?,
        })
    })?;

    let mut hits = Vec::new();
    for row in rows {
        hits.push(row?);
    }
    Ok(hits)
}
