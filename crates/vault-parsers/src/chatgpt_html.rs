//! Best-effort fallback for ChatGPT's legacy `chat.html` export, used only
//! when an archive has no `conversations.json` sibling. Regex-scans
//! `<div class="message">` blocks rather than parsing real HTML, so it
//! tolerates malformed markup at the cost of precision.

use std::sync::OnceLock;

use regex::Regex;
use rusqlite::Transaction;
use vault_common::{Error, Provider, Result, Role};
use vault_store::{insert_message, insert_thread, ParseOutcome};

use crate::parser::Parser;

pub struct ChatgptHtmlParser;

fn author_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)<div class="author">(.*?)</div>"#).unwrap())
}

fn content_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)<div class="content">(.*?)</div>"#).unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

impl Parser for ChatgptHtmlParser {
    fn parse(
        &self,
        tx: &Transaction,
        run_id: i64,
        artifact_id: i64,
        text: &str,
    ) -> Result<ParseOutcome> {
        let blocks: Vec<&str> = text.split("<div class=\"message\">").skip(1).collect();
        if blocks.is_empty() {
            return Err(Error::HtmlNoMessages);
        }

        let thread_id = insert_thread(
            tx,
            Provider::Chatgpt,
            None,
            "ChatGPT Export (HTML)",
            None,
            artifact_id,
            run_id,
        )?;

        let mut position = 0i64;
        let mut messages_inserted = 0u64;

        for block in blocks {
            let author = match author_re().captures(block) {
                Some(c) => c.get(1).unwrap().as_str(),
                None => continue,
            };
            let content = match content_re().captures(block) {
                Some(c) => c.get(1).unwrap().as_str(),
                None => continue,
            };

            let role = Role::from_verbatim(author.trim());
            let plain_content = tag_re().replace_all(content, "").trim().to_string();

            insert_message(
                tx,
                thread_id,
                Provider::Chatgpt,
                None,
                role.as_str(),
                content,
                &plain_content,
                None,
                position,
                None,
                artifact_id,
                run_id,
            )?;
            position += 1;
            messages_inserted += 1;
        }

        if messages_inserted == 0 {
            return Err(Error::HtmlNoMessages);
        }

        Ok(ParseOutcome {
            threads_inserted: 1,
            messages_inserted,
        })
    }
}
