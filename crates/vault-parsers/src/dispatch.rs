//! Parser selection: a small registry keyed by a tag, each entry a boxed
//! trait object, scaled down to four statically-registered implementations.
//! No dynamic loading is needed or introduced: the dispatch table here is
//! the entire registry.

use vault_common::Provider;

use crate::chatgpt_html::ChatgptHtmlParser;
use crate::chatgpt_json::ChatgptJsonParser;
use crate::claude_json::ClaudeJsonParser;
use crate::gemini_json::GeminiJsonParser;
use crate::parser::Parser;

/// Selects a parser for one archive entry by `(provider, entry name)`.
/// Returns `None` for entries that should be stored as artifacts but not
/// parsed — forensic preservation without semantic loss.
pub fn select_parser(provider: Provider, entry_name: &str) -> Option<Box<dyn Parser>> {
    let lower = entry_name.to_lowercase();
    match provider {
        Provider::Chatgpt => {
            if lower == "conversations.json" || lower.ends_with("/conversations.json") {
                Some(Box::new(ChatgptJsonParser))
            } else if lower == "chat.html" || lower.ends_with("/chat.html") {
                Some(Box::new(ChatgptHtmlParser))
            } else {
                None
            }
        }
        Provider::Claude => lower
            .ends_with(".json")
            .then(|| Box::new(ClaudeJsonParser) as Box<dyn Parser>),
        Provider::Gemini => lower
            .ends_with(".json")
            .then(|| Box::new(GeminiJsonParser) as Box<dyn Parser>),
    }
}

/// Selects the parser for a bare (non-archive) import: dispatch by provider
/// alone, since there is no entry name to inspect. A standalone file is
/// virtually always the provider's primary export JSON; the HTML fallback
/// is only ever reached via an explicit `chat.html` entry inside an archive.
pub fn default_parser_for_provider(provider: Provider) -> Box<dyn Parser> {
    match provider {
        Provider::Chatgpt => Box::new(ChatgptJsonParser),
        Provider::Claude => Box::new(ClaudeJsonParser),
        Provider::Gemini => Box::new(GeminiJsonParser),
    }
}
