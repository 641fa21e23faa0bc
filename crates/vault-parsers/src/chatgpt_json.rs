//! The ChatGPT `conversations.json` normalizer.
//!
//! Input is an array of conversation objects, each a `mapping` from node id
//! to `{message, parent}`. Only nodes whose `content.content_type == "text"`
//! carry anything worth keeping; tool calls and images are skipped silently
//! rather than imported as empty messages.

use rusqlite::Transaction;
use serde_json::Value;
use vault_common::{Error, Provider, Result, Role};
use vault_store::{insert_message, insert_thread, ParseOutcome};

use crate::parser::Parser;

pub struct ChatgptJsonParser;

impl Parser for ChatgptJsonParser {
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

    let mapping = obj
        .get("mapping")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::SchemaMismatch("conversation is missing a mapping field".into()))?;

    let title = obj.get("title").and_then(Value::as_str).unwrap_or("Untitled");
    let provider_thread_id = obj.get("id").and_then(Value::as_str);
    let created_at = obj
        .get("create_time")
        .and_then(Value::as_f64)
        .map(|seconds| (seconds * 1000.0) as i64);

    let thread_id = insert_thread(
        tx,
        Provider::Chatgpt,
        provider_thread_id,
        title,
        created_at,
        artifact_id,
        run_id,
    )?;

    let mut position = 0i64;
    let mut messages_inserted = 0u64;

    for (node_id, node) in mapping {
        let node_obj = match node.as_object() {
            Some(o) => o,
            None => continue,
        };

        let message = match node_obj.get("message").filter(|m| !m.is_null()) {
            Some(m) => m,
            None => continue,
        };

        let content = message.get("content").and_then(Value::as_object);
        let content_type = content
            .and_then(|c| c.get("content_type"))
            .and_then(Value::as_str)
            .unwrap_or("");
        if content_type != "text" {
            continue;
        }

        let parts: Vec<&str> = content
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| parts.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if parts.is_empty() {
            continue;
        }

        let raw_content = parts.join("\n");
        let plain_content = strip_markdown(&raw_content);

        let role_str = message
            .get("author")
            .and_then(Value::as_object)
            .and_then(|a| a.get("role"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let role = Role::from_verbatim(role_str);

        let message_timestamp = message
            .get("create_time")
            .and_then(Value::as_f64)
            .map(|seconds| (seconds * 1000.0) as i64);

        let parent = node_obj.get("parent").and_then(Value::as_str);
        let provider_message_id = if node_id.is_empty() { None } else { Some(node_id.as_str()) };

        insert_message(
            tx,
            thread_id,
            Provider::Chatgpt,
            provider_message_id,
            role.as_str(),
            &raw_content,
            &plain_content,
            message_timestamp,
            position,
            parent,
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

/// Strips the markdown characters `# * \`` from `text`, leaving everything
/// else untouched.
fn strip_markdown(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '#' | '*' | '`')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {
            "id": "conv-1",
            "title": "Sentinel thread",
            "create_time": 1700000000.0,
            "mapping": {
                "node-a": {
                    "parent": null,
                    "message": {
                        "author": { "role": "user" },
                        "create_time": 1700000000.0,
                        "content": { "content_type": "text", "parts": ["hello SENTINEL_CHATGPT_001"] }
                    }
                },
                "node-b": {
                    "parent": "node-a",
                    "message": {
                        "author": { "role": "assistant" },
                        "create_time": 1700000001.0,
                        "content": { "content_type": "text", "parts": ["# **hi** there"] }
                    }
                },
                "node-c": {
                    "parent": "node-b",
                    "message": {
                        "author": { "role": "assistant" },
                        "create_time": 1700000002.0,
                        "content": { "content_type": "image_asset_pointer", "parts": [] }
                    }
                },
                "node-d": {
                    "parent": "node-b",
                    "message": null
                }
            }
        }
    ]"#;

    #[test]
    fn imports_text_nodes_and_skips_non_text_and_empty() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        vault_store::migrate(&mut conn, None).unwrap();
        let tx = conn.transaction().unwrap();

        let outcome = ChatgptJsonParser.parse(&tx, 1, 1, FIXTURE).unwrap();
        assert_eq!(outcome.threads_inserted, 1);
        assert_eq!(outcome.messages_inserted, 2);

        let content: String = tx
            .query_row(
                "SELECT content FROM messages WHERE content LIKE '%SENTINEL_CHATGPT_001%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(content.contains("SENTINEL_CHATGPT_001"));
    }

    #[test]
    fn strips_markdown_characters_from_plain_content() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        vault_store::migrate(&mut conn, None).unwrap();
        let tx = conn.transaction().unwrap();

        ChatgptJsonParser.parse(&tx, 1, 1, FIXTURE).unwrap();

        let plain: String = tx
            .query_row(
                "SELECT content_plain FROM messages WHERE content LIKE '%hi%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(plain, " hi there");
    }

    #[test]
    fn missing_mapping_field_is_schema_mismatch() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        vault_store::migrate(&mut conn, None).unwrap();
        let tx = conn.transaction().unwrap();

        let err = ChatgptJsonParser
            .parse(&tx, 1, 1, r#"[{"id": "x", "title": "no mapping here"}]"#)
            .unwrap_err();
        assert_eq!(err.code(), vault_common::ErrorCode::SchemaMismatch);
    }
}
