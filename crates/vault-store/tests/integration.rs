//! End-to-end coverage across the Store's public surface: a full
//! insert -> search -> wipe -> reimport cycle, exercised the way the
//! Ingest Controller actually drives it.

use vault_common::Provider;
use vault_store::{
    create_ingestion_run, finalize_ingestion_run, insert_message, insert_thread, search,
    store_raw_artifact, wipe, RunStatus,
};

fn open_vault(dir: &std::path::Path) -> (rusqlite::Connection, std::path::PathBuf) {
    let artifacts_dir = dir.join("artifacts");
    std::fs::create_dir_all(&artifacts_dir).unwrap();
    let conn = vault_store::open(&dir.join("vault.db")).unwrap();
    (conn, artifacts_dir)
}

fn seed_one_message(
    conn: &mut rusqlite::Connection,
    artifacts_dir: &std::path::Path,
    content: &str,
) -> i64 {
    let run = create_ingestion_run(conn, Provider::Chatgpt, Some("test")).unwrap();
    let artifact = store_raw_artifact(
        conn,
        artifacts_dir,
        run.id,
        Provider::Chatgpt,
        "json",
        "conversations.json",
        content.as_bytes(),
        None,
        None,
    )
    .unwrap();

    let tx = conn.transaction().unwrap();
    let thread_id = insert_thread(&tx, Provider::Chatgpt, Some("c1"), "t", Some(1), artifact.id, run.id).unwrap();
    insert_message(
        &tx,
        thread_id,
        Provider::Chatgpt,
        Some("m1"),
        "user",
        content,
        content,
        Some(1),
        0,
        None,
        artifact.id,
        run.id,
    )
    .unwrap();
    tx.commit().unwrap();

    finalize_ingestion_run(conn, run.id, RunStatus::Complete, None, None).unwrap();
    run.id
}

#[test]
fn fts_finds_inserted_message_by_content() {
    let dir = tempfile::tempdir().unwrap();
    let (mut conn, artifacts_dir) = open_vault(dir.path());
    seed_one_message(&mut conn, &artifacts_dir, "the quick brown fox SENTINEL_ALPHA");

    let hits = search(&conn, "SENTINEL_ALPHA").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].thread_title, "t");
    assert_eq!(hits[0].provider, "chatgpt");

    let miss = search(&conn, "SENTINEL_NEVER_INSERTED").unwrap();
    assert!(miss.is_empty());
}

#[test]
fn fts_index_tracks_deletes_via_triggers() {
    let dir = tempfile::tempdir().unwrap();
    let (mut conn, artifacts_dir) = open_vault(dir.path());
    seed_one_message(&mut conn, &artifacts_dir, "SENTINEL_BETA content");
    assert_eq!(search(&conn, "SENTINEL_BETA").unwrap().len(), 1);

    conn.execute("DELETE FROM messages", []).unwrap();
    assert!(search(&conn, "SENTINEL_BETA").unwrap().is_empty());
}

#[test]
fn wipe_then_reimport_yields_identical_search_results() {
    let dir = tempfile::tempdir().unwrap();
    let (mut conn, artifacts_dir) = open_vault(dir.path());
    seed_one_message(&mut conn, &artifacts_dir, "SENTINEL_GAMMA repeated content");

    let before = search(&conn, "SENTINEL_GAMMA").unwrap();
    assert_eq!(before.len(), 1);

    wipe(&mut conn, &artifacts_dir).unwrap();
    assert!(search(&conn, "SENTINEL_GAMMA").unwrap().is_empty());

    let thread_count: i64 = conn.query_row("SELECT COUNT(*) FROM threads", [], |r| r.get(0)).unwrap();
    let artifact_count: i64 = conn.query_row("SELECT COUNT(*) FROM raw_artifacts", [], |r| r.get(0)).unwrap();
    assert_eq!(thread_count, 0);
    assert_eq!(artifact_count, 0);
    assert!(std::fs::read_dir(&artifacts_dir).unwrap().next().is_none());

    seed_one_message(&mut conn, &artifacts_dir, "SENTINEL_GAMMA repeated content");
    let after = search(&conn, "SENTINEL_GAMMA").unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].content, before[0].content);
}

#[test]
fn failed_run_leaves_no_partial_thread_or_message_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (mut conn, artifacts_dir) = open_vault(dir.path());

    let run = create_ingestion_run(&mut conn, Provider::Claude, None).unwrap();
    let artifact = store_raw_artifact(
        &mut conn,
        &artifacts_dir,
        run.id,
        Provider::Claude,
        "json",
        "data.json",
        b"{}",
        None,
        None,
    )
    .unwrap();

    // A parser-shaped failure mid-transaction: insert a thread, then bail
    // out before committing, the same way the Ingest Controller rolls back
    // a single bad entry.
    {
        let tx = conn.transaction().unwrap();
        insert_thread(&tx, Provider::Claude, Some("c1"), "t", None, artifact.id, run.id).unwrap();
        tx.rollback().unwrap();
    }
    finalize_ingestion_run(
        &mut conn,
        run.id,
        RunStatus::Failed,
        Some("simulated parse failure"),
        Some(vault_common::ErrorCode::DbWriteFailed.as_str()),
    )
    .unwrap();

    let thread_count: i64 = conn.query_row("SELECT COUNT(*) FROM threads", [], |r| r.get(0)).unwrap();
    assert_eq!(thread_count, 0);

    let runs = vault_store::diagnostics::recent_runs(&conn, 10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert_eq!(runs[0].error_message.as_deref(), Some("simulated parse failure"));
    assert_eq!(runs[0].error_code.as_deref(), Some("DB_WRITE_FAILED"));
}
