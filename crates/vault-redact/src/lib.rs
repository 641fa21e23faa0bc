//! Path redaction for the diagnostics RPC.
//!
//! The diagnostics surface allows recent run error tails to reach the
//! caller, but any absolute filesystem path inside that tail must first
//! be redacted to `[PATH_REDACTED]` — the diagnostics privacy allowlist
//! must never leak where on disk the user's vault lives.
//!
//! One class (absolute path) and one action (replace): no broader
//! field-classification engine is introduced since this repo has no other
//! redaction surface.

use regex::Regex;
use std::sync::OnceLock;

const REDACTED: &str = "[PATH_REDACTED]";

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Unix absolute paths and Windows drive-letter paths, greedily up
        // to the next whitespace or quote.
        Regex::new(r#"(?:/[^\s"']+)|(?:[A-Za-z]:\\[^\s"']+)"#).expect("static regex is valid")
    })
}

/// Replaces every absolute path in `text` with `[PATH_REDACTED]`.
pub fn redact_paths(text: &str) -> String {
    pattern().replace_all(text, REDACTED).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_unix_absolute_path() {
        let input = "failed to read /home/user/.vault/vault.db: permission denied";
        let out = redact_paths(input);
        assert_eq!(
            out,
            "failed to read [PATH_REDACTED]: permission denied"
        );
    }

    #[test]
    fn redacts_windows_absolute_path() {
        let input = r"open C:\Users\alice\vault\vault.db failed";
        let out = redact_paths(input);
        assert_eq!(out, "open [PATH_REDACTED] failed");
    }

    #[test]
    fn leaves_relative_text_untouched() {
        let input = "SCHEMA_MISMATCH: no mapping field";
        assert_eq!(redact_paths(input), input);
    }

    #[test]
    fn redacts_multiple_paths_in_one_message() {
        let input = "copy /a/b.txt to /c/d.txt failed";
        assert_eq!(
            redact_paths(input),
            "copy [PATH_REDACTED] to [PATH_REDACTED] failed"
        );
    }
}
