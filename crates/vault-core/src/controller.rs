//! The Ingest Controller: orchestrates one import end to end — safety
//! pre-scan of the archive (if any), atomic extraction, parser dispatch,
//! and run lifecycle.

use std::path::Path;

use rusqlite::Connection;
use tracing::{info, warn};
use vault_archive::{SafeZip, ZipLimits};
use vault_common::{Provider, Result};
use vault_parsers::{default_parser_for_provider, select_parser};
use vault_store::{
    create_ingestion_run, finalize_ingestion_run, store_raw_artifact, ParseOutcome, RunStatus,
};

/// The result of one `importHeadless` call.
#[derive(Debug, Clone, Copy)]
pub struct ImportOutcome {
    pub run_id: i64,
    pub artifact_id: i64,
    pub parse_outcome: ParseOutcome,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

fn looks_like_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Runs one headless import: reads `file_path`, stores it as the parent
/// artifact, and either decodes it directly (non-archive) or runs it
/// through the ZIP Safety Protocol and extraction loop.
pub fn import_headless(
    conn: &mut Connection,
    artifacts_dir: &Path,
    provider: Provider,
    file_path: &Path,
    source_label: Option<&str>,
) -> Result<ImportOutcome> {
    let bytes = std::fs::read(file_path)?;
    let filename = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "import".to_string());

    let run = create_ingestion_run(conn, provider, source_label)?;
    info!(run_id = run.id, provider = %provider, %filename, "import started");

    let result = run_import(conn, artifacts_dir, provider, &filename, &bytes, run.id);

    match &result {
        Ok(outcome) => {
            finalize_ingestion_run(conn, run.id, RunStatus::Complete, None, None)?;
            info!(
                run_id = run.id,
                threads = outcome.parse_outcome.threads_inserted,
                messages = outcome.parse_outcome.messages_inserted,
                "import complete"
            );
        }
        Err(e) => {
            finalize_ingestion_run(conn, run.id, RunStatus::Failed, Some(&e.to_string()), Some(e.code().as_str()))?;
            warn!(run_id = run.id, error = %e, code = %e.code(), "import failed");
        }
    }

    result
}

fn run_import(
    conn: &mut Connection,
    artifacts_dir: &Path,
    provider: Provider,
    filename: &str,
    bytes: &[u8],
    run_id: i64,
) -> Result<ImportOutcome> {
    let is_zip = looks_like_zip(bytes);
    let artifact_type = if is_zip { "zip" } else { "json" };

    let parent = store_raw_artifact(
        conn,
        artifacts_dir,
        run_id,
        provider,
        artifact_type,
        filename,
        bytes,
        None,
        None,
    )?;

    let parse_outcome = if is_zip {
        import_zip(conn, artifacts_dir, provider, bytes, run_id, parent.id)?
    } else {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let parser = default_parser_for_provider(provider);
        let tx = conn.transaction()?;
        let outcome = parser.parse(&tx, run_id, parent.id, &text)?;
        tx.commit()?;
        outcome
    };

    Ok(ImportOutcome {
        run_id,
        artifact_id: parent.id,
        parse_outcome,
    })
}

fn import_zip(
    conn: &mut Connection,
    artifacts_dir: &Path,
    provider: Provider,
    bytes: &[u8],
    run_id: i64,
    parent_artifact_id: i64,
) -> Result<ParseOutcome> {
    let limits = ZipLimits::from_env();
    let mut archive = SafeZip::open(bytes.to_vec(), &limits)?;

    let entries: Vec<_> = archive.entries.clone();
    let mut outcome = ParseOutcome::default();

    for (index, entry) in entries.iter().enumerate() {
        let (name, data) = match archive.extract(index) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(run_id, entry = %entry.name, error = %e, code = %e.code(), "entry extraction failed, continuing");
                continue;
            }
        };

        let child = match store_raw_artifact(
            conn,
            artifacts_dir,
            run_id,
            provider,
            artifact_type_for(&name),
            &name,
            &data,
            Some(parent_artifact_id),
            Some(entry.name.as_str()),
        ) {
            Ok(child) => child,
            Err(e) => {
                warn!(run_id, entry = %name, error = %e, code = %e.code(), "entry artifact write failed, continuing");
                continue;
            }
        };

        let Some(parser) = select_parser(provider, &name) else {
            continue;
        };

        let text = String::from_utf8_lossy(&data).into_owned();
        let tx = conn.transaction()?;
        match parser.parse(&tx, run_id, child.id, &text) {
            Ok(entry_outcome) => {
                tx.commit()?;
                outcome = outcome.merge(entry_outcome);
            }
            Err(e) => {
                tx.rollback()?;
                warn!(run_id, entry = %name, error = %e, code = %e.code(), "entry parse failed, continuing");
            }
        }
    }

    Ok(outcome)
}

fn artifact_type_for(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.ends_with(".json") {
        "json"
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        "html"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vault_store::search;
    use zip::write::{FileOptions, ZipWriter};

    fn open_vault(dir: &std::path::Path) -> (Connection, std::path::PathBuf) {
        let artifacts_dir = dir.join("artifacts");
        std::fs::create_dir_all(&artifacts_dir).unwrap();
        let conn = vault_store::open(&dir.join("vault.db")).unwrap();
        (conn, artifacts_dir)
    }

    #[test]
    fn imports_bare_chatgpt_json_and_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, artifacts_dir) = open_vault(dir.path());

        let fixture_path = dir.path().join("conversations.json");
        std::fs::write(
            &fixture_path,
            r#"[{"id":"c1","title":"t","create_time":1.0,"mapping":{"n1":{"parent":null,"message":{"author":{"role":"user"},"create_time":1.0,"content":{"content_type":"text","parts":["SENTINEL_CHATGPT_001"]}}}}}]"#,
        )
        .unwrap();

        let outcome = import_headless(&mut conn, &artifacts_dir, Provider::Chatgpt, &fixture_path, None).unwrap();
        assert_eq!(outcome.parse_outcome.messages_inserted, 1);

        let hits = search(&conn, "SENTINEL_CHATGPT_001").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].provider, "chatgpt");
    }

    #[test]
    fn imports_zip_with_conversations_json_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, artifacts_dir) = open_vault(dir.path());

        let zip_path = dir.path().join("export.zip");
        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options: FileOptions<()> = FileOptions::default();
        writer.start_file("conversations.json", options).unwrap();
        writer
            .write_all(br#"[{"id":"c1","title":"t","create_time":1.0,"mapping":{"n1":{"parent":null,"message":{"author":{"role":"user"},"create_time":1.0,"content":{"content_type":"text","parts":["hi"]}}}}}]"#)
            .unwrap();
        writer.finish().unwrap();

        let outcome = import_headless(&mut conn, &artifacts_dir, Provider::Chatgpt, &zip_path, None).unwrap();
        assert_eq!(outcome.parse_outcome.threads_inserted, 1);

        let run = vault_store::get_ingestion_run(&conn, outcome.run_id).unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Complete);
    }

    #[test]
    fn path_traversal_entry_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, artifacts_dir) = open_vault(dir.path());

        let zip_path = dir.path().join("evil.zip");
        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options: FileOptions<()> = FileOptions::default();
        writer.start_file("../outside.txt", options).unwrap();
        writer.write_all(b"pwned").unwrap();
        writer.finish().unwrap();

        let err = import_headless(&mut conn, &artifacts_dir, Provider::Chatgpt, &zip_path, None).unwrap_err();
        assert_eq!(err.code(), vault_common::ErrorCode::ZipSlipDetected);

        assert!(!dir.path().join("outside.txt").exists());
        assert!(!artifacts_dir.join("outside.txt").exists());

        let runs = vault_store::diagnostics::recent_runs(&conn, 10).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, RunStatus::Failed);

        let thread_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM threads", [], |r| r.get(0))
            .unwrap();
        assert_eq!(thread_count, 0);
    }

    #[test]
    fn entry_artifact_write_failure_does_not_fail_the_whole_run() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, artifacts_dir) = open_vault(dir.path());

        let good_content: &[u8] = br#"[{"id":"c1","title":"t","create_time":1.0,"mapping":{"n1":{"parent":null,"message":{"author":{"role":"user"},"create_time":1.0,"content":{"content_type":"text","parts":["SENTINEL_PARTIAL_OK"]}}}}}]"#;
        let unreachable_content: &[u8] = br#"{"whatever":"bytes"}"#;

        // Pre-occupy the exact path the second entry would be stored at
        // with a directory, so its artifact write fails with
        // FS_WRITE_FAILED while the first entry's write still succeeds.
        let blocked_sha = vault_common::util::sha256_hex(unreachable_content);
        let blocked_name = vault_common::util::sanitize_basename("broken.json");
        let blocked_path = artifacts_dir.join(format!("{blocked_sha}-{blocked_name}"));
        std::fs::create_dir_all(&blocked_path).unwrap();

        let zip_path = dir.path().join("export.zip");
        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options: FileOptions<()> = FileOptions::default();
        writer.start_file("conversations.json", options).unwrap();
        writer.write_all(good_content).unwrap();
        writer.start_file("broken.json", options).unwrap();
        writer.write_all(unreachable_content).unwrap();
        writer.finish().unwrap();

        let outcome = import_headless(&mut conn, &artifacts_dir, Provider::Chatgpt, &zip_path, None).unwrap();
        assert_eq!(outcome.parse_outcome.threads_inserted, 1);
        assert_eq!(outcome.parse_outcome.messages_inserted, 1);

        let run = vault_store::get_ingestion_run(&conn, outcome.run_id).unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Complete);

        let hits = search(&conn, "SENTINEL_PARTIAL_OK").unwrap();
        assert_eq!(hits.len(), 1);
    }
}
