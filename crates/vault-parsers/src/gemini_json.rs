//! The Gemini conversation export normalizer. The source shape is not
//! pinned down the way ChatGPT's and Claude's are: message objects carry
//! whichever of a handful of field names the exporting client chose, so
//! field and role selection is deliberately lenient rather than strict.

use rusqlite::Transaction;
use serde_json::Value;
use vault_common::{util, Error, Provider, Result, Role};
use vault_store::{insert_message, insert_thread, ParseOutcome};

use crate::parser::Parser;
use crate::timestamp::parse_iso_to_epoch_ms;

pub struct GeminiJsonParser;

impl Parser for GeminiJsonParser {
    fn parse(
        &self,
        tx: &Transaction,
        run_id: i64,
        artifact_id: i64,
        text: &str,
    ) -> Result<ParseOutcome> {
        let value: Value = serde_json::from_str(text)?;
        let conversations = value
            .as_array()
            .ok_or_else(|| Error::SchemaMismatch("expected a JSON array of conversations".into()))?;

        let mut outcome = ParseOutcome::default();
        for conversation in conversations {
            outcome = outcome.merge(parse_conversation(tx, run_id, artifact_id, conversation)?);
        }
        Ok(outcome)
    }
}

fn parse_conversation(
    tx: &Transaction,
    run_id: i64,
    artifact_id: i64,
    conversation: &Value,
) -> Result<ParseOutcome> {
    let obj = conversation
        .as_object()
        .ok_or_else(|| Error::SchemaMismatch("conversation entry is not an object".into()))?;

    let messages = obj
        .get("conversations")
        .and_then(Value::as_array)
        .or_else(|| obj.get("messages").and_then(Value::as_array))
        .ok_or_else(|| {
            Error::SchemaMismatch("conversation is missing a conversations or messages field".into())
        })?;

    let title = obj.get("title").and_then(Value::as_str).unwrap_or("Untitled");
    let thread_id = insert_thread(tx, Provider::Gemini, None, title, None, artifact_id, run_id)?;

    let mut position = 0i64;
    let mut messages_inserted = 0u64;
    for message in messages {
        let message_obj = match message.as_object() {
            Some(o) => o,
            None => continue,
        };

        let content = match util::first_non_empty(&[
            message_obj.get("content").and_then(Value::as_str),
            message_obj.get("text").and_then(Value::as_str),
            message_obj.get("prompt_text").and_then(Value::as_str),
            message_obj.get("response_text").and_then(Value::as_str),
        ]) {
            Some(c) => c,
            None => continue,
        };

        let role_raw = util::first_non_empty(&[
            message_obj.get("author").and_then(Value::as_str),
            message_obj.get("sender").and_then(Value::as_str),
            message_obj.get("role").and_then(Value::as_str),
        ])
        .unwrap_or("unknown");
        let role = Role::from_substring_match(role_raw);

        let timestamp = util::first_non_empty(&[
            message_obj.get("created_at").and_then(Value::as_str),
            message_obj.get("timestamp").and_then(Value::as_str),
            message_obj.get("time").and_then(Value::as_str),
        ])
        .and_then(parse_iso_to_epoch_ms);

        insert_message(
            tx,
            thread_id,
            Provider::Gemini,
            None,
            role.as_str(),
            content,
            content,
            timestamp,
            position,
            None,
            artifact_id,
            run_id,
        )?;
        position += 1;
        messages_inserted += 1;
    }

    Ok(ParseOutcome {
        threads_inserted: 1,
        messages_inserted,
    })
}
