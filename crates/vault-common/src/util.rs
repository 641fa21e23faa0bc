//! Small shared combinators.

use sha2::{Digest, Sha256};

/// Returns the first argument that is `Some` and non-empty once trimmed.
///
/// Grounded on the Gemini parser's lenient field selection: the source
/// format allows `content | text | prompt_text | response_text`, any of
/// which may be present, absent, or blank.
pub fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .copied()
}

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Strips a leading directory component from a candidate filename, exactly
/// as `path.basename` would — used to sanitize artifact filenames before
/// they ever touch the filesystem.
pub fn sanitize_basename(name: &str) -> String {
    name.replace('\\', "/")
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_skips_blank_and_none() {
        let candidates = [Some(""), None, Some("  "), Some("hello")];
        assert_eq!(first_non_empty(&candidates), Some("hello"));
    }

    #[test]
    fn first_non_empty_returns_none_when_all_blank() {
        let candidates: [Option<&str>; 3] = [None, Some(""), Some("   ")];
        assert_eq!(first_non_empty(&candidates), None);
    }

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn sanitize_basename_strips_directories() {
        assert_eq!(sanitize_basename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_basename("a\\b\\c.json"), "c.json");
        assert_eq!(sanitize_basename("plain.json"), "plain.json");
    }
}
