//! ISO-8601 timestamp parsing shared by the Claude and Gemini normalizers.

/// Parses an RFC 3339 / ISO-8601 timestamp string to epoch milliseconds.
/// Returns `None` on any unparseable input rather than failing the parse.
pub fn parse_iso_to_epoch_ms(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
