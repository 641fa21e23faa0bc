//! The Claude conversation export normalizer: `uuid`/`name`/`created_at`
//! conversations containing a `chat_messages` array.

use rusqlite::Transaction;
use serde_json::Value;
use vault_common::{Error, Provider, Result, Role};
use vault_store::{insert_message, insert_thread, ParseOutcome};

use crate::parser::Parser;
use crate::timestamp::parse_iso_to_epoch_ms;

pub struct ClaudeJsonParser;

impl Parser for ClaudeJsonParser {
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

    let chat_messages = obj
        .get("chat_messages")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::SchemaMismatch("conversation is missing a chat_messages field".into()))?;

    let title = obj.get("name").and_then(Value::as_str).unwrap_or("Untitled");
    let provider_thread_id = obj.get("uuid").and_then(Value::as_str);
    let created_at = obj
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_iso_to_epoch_ms);

    let thread_id = insert_thread(
        tx,
        Provider::Claude,
        provider_thread_id,
        title,
        created_at,
        artifact_id,
        run_id,
    )?;

    let mut position = 0i64;
    let mut messages_inserted = 0u64;
    for message in chat_messages {
        let message_obj = match message.as_object() {
            Some(o) => o,
            None => continue,
        };
        let content = match message_obj.get("text").and_then(Value::as_str) {
            Some(t) if !t.is_empty() => t,
            _ => continue,
        };
        let sender = message_obj.get("sender").and_then(Value::as_str).unwrap_or("unknown");
        let role = Role::from_verbatim(sender);
        let provider_message_id = message_obj.get("uuid").and_then(Value::as_str);
        let timestamp = message_obj
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_iso_to_epoch_ms);

        insert_message(
            tx,
            thread_id,
            Provider::Claude,
            provider_message_id,
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
