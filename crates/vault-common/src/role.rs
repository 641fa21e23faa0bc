//! Message role normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized message role. Providers emit free-form strings; known values
/// are folded into the fixed variants, anything else is preserved verbatim
/// so no information is lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Unknown(String),
}

impl Role {
    /// Exact-match role used by the ChatGPT and Claude parsers, which pass
    /// the provider's own role string through verbatim.
    pub fn from_verbatim(raw: &str) -> Role {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            other => Role::Unknown(other.to_string()),
        }
    }

    /// Case-insensitive substring match used by the Gemini parser: any of
    /// `gemini, assistant, model, ai` folds to assistant, `user` folds to
    /// user, anything else passes through unchanged.
    pub fn from_substring_match(raw: &str) -> Role {
        let lower = raw.to_lowercase();
        if lower.contains("user") {
            Role::User
        } else if ["gemini", "assistant", "model", "ai"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            Role::Assistant
        } else {
            Role::Unknown(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Unknown(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
