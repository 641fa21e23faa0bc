//! The headless smoke driver contract: import a fixture, search for a
//! sentinel, wipe, and confirm the sentinel is gone — writing one JSON
//! report file and exiting 0 on pass, 1 on fail.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use vault_common::{ErrorCode, Provider};
use vault_paths::PathRoot;

#[derive(Debug, Clone, Serialize)]
pub struct SmokeReport {
    pub app_version: String,
    pub commit_sha: Option<String>,
    pub electron_version: Option<String>,
    pub node_version: Option<String>,
    pub platform: String,
    pub provider: String,
    pub fixture_name: String,
    pub sentinel: String,
    pub pass: bool,
    pub import_ms: u128,
    pub search_hits: usize,
    pub search_ms: u128,
    pub wipe_ok: bool,
    pub post_wipe_hits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

pub struct SmokeArgs<'a> {
    pub vault_dir: PathBuf,
    pub import: &'a Path,
    pub sentinel: String,
    pub provider: Provider,
    pub smoke_out: &'a Path,
}

/// Runs the smoke scenario and writes the report to `args.smoke_out`.
/// Returns the report and the process exit code (0 = pass, 1 = fail).
pub fn run_smoke(args: SmokeArgs<'_>) -> (SmokeReport, i32) {
    let fixture_name = args
        .import
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    let mut report = SmokeReport {
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        commit_sha: std::env::var("VAULT_COMMIT_SHA").ok(),
        electron_version: None,
        node_version: None,
        platform: std::env::consts::OS.to_string(),
        provider: args.provider.as_str().to_string(),
        fixture_name,
        sentinel: args.sentinel.clone(),
        pass: false,
        import_ms: 0,
        search_hits: 0,
        search_ms: 0,
        wipe_ok: false,
        post_wipe_hits: 0,
        error_code: None,
        error_message: None,
    };

    let root = match PathRoot::init(args.vault_dir.clone()) {
        Ok(root) => root,
        Err(e) => {
            report.error_code = Some(e.code().as_str());
            report.error_message = Some(e.to_string());
            write_report(&report, args.smoke_out);
            return (report, 1);
        }
    };

    let import_start = Instant::now();
    let import_result = crate::rpc::import_headless(root, args.provider, args.import);
    report.import_ms = import_start.elapsed().as_millis();

    if let Err(e) = import_result {
        report.error_code = Some(e.code().as_str());
        report.error_message = Some(e.to_string());
        write_report(&report, args.smoke_out);
        return (report, 1);
    }

    let search_start = Instant::now();
    let hits = match crate::rpc::search(root, &args.sentinel) {
        Ok(hits) => hits,
        Err(e) => {
            report.error_code = Some(e.code().as_str());
            report.error_message = Some(e.to_string());
            write_report(&report, args.smoke_out);
            return (report, 1);
        }
    };
    report.search_ms = search_start.elapsed().as_millis();
    report.search_hits = hits.len();

    if hits.is_empty() {
        report.error_code = Some(ErrorCode::UnknownError.as_str());
        report.error_message = Some(format!("sentinel {:?} not found after import", args.sentinel));
        write_report(&report, args.smoke_out);
        return (report, 1);
    }

    report.wipe_ok = crate::rpc::wipe(root).is_ok();
    if !report.wipe_ok {
        write_report(&report, args.smoke_out);
        return (report, 1);
    }

    report.post_wipe_hits = crate::rpc::search(root, &args.sentinel).map(|h| h.len()).unwrap_or(usize::MAX);

    report.pass = report.wipe_ok && report.post_wipe_hits == 0;
    let code = if report.pass { 0 } else { 1 };
    write_report(&report, args.smoke_out);
    (report, code)
}

fn write_report(report: &SmokeReport, path: &Path) {
    if let Ok(json) = serde_json::to_string_pretty(report) {
        let _ = std::fs::write(path, json);
    }
}
