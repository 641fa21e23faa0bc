//! The one interface every provider normalizer implements.

use rusqlite::Transaction;
use vault_common::Result;
use vault_store::ParseOutcome;

/// Normalizes one decoded artifact's text into `threads`/`messages` rows.
///
/// A single call is the atomicity unit: the caller wraps it in a
/// transaction, so a failure partway through leaves zero new rows visible.
/// Implementations are provider-agnostic consumers of `(run, artifact,
/// text)` — the Ingest Controller is the only place that ever looks at a
/// provider tag or entry name to pick one.
pub trait Parser {
    fn parse(
        &self,
        tx: &Transaction,
        run_id: i64,
        artifact_id: i64,
        text: &str,
    ) -> Result<ParseOutcome>;
}
