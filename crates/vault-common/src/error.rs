//! The error taxonomy shared by every crate in the vault.
//!
//! Each variant carries the stable wire code from the ingestion error table;
//! callers that need to bridge to an RPC response or a smoke-driver report
//! call [`Error::code`] rather than matching on the `Display` string.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, machine-readable error codes. These are the wire contract: the
/// RPC surface and the smoke driver report map errors to these strings, not
/// to `Display` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ZipEntryTooLarge,
    ZipTotalTooLarge,
    ZipTooManyEntries,
    ZipCorrupt,
    ZipSlipDetected,
    ParseJsonFailed,
    ParseChatHtmlFailed,
    HtmlNoMessages,
    SchemaMismatch,
    DbWriteFailed,
    FsWriteFailed,
    UnknownError,
}

impl ErrorCode {
    /// The wire string, exactly as named in the error table.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ZipEntryTooLarge => "ZIP_ENTRY_TOO_LARGE",
            ErrorCode::ZipTotalTooLarge => "ZIP_TOTAL_TOO_LARGE",
            ErrorCode::ZipTooManyEntries => "ZIP_TOO_MANY_ENTRIES",
            ErrorCode::ZipCorrupt => "ZIP_CORRUPT",
            ErrorCode::ZipSlipDetected => "ZIP_SLIP_DETECTED",
            ErrorCode::ParseJsonFailed => "PARSE_JSON_FAILED",
            ErrorCode::ParseChatHtmlFailed => "PARSE_CHAT_HTML_FAILED",
            ErrorCode::HtmlNoMessages => "HTML_NO_MESSAGES",
            ErrorCode::SchemaMismatch => "SCHEMA_MISMATCH",
            ErrorCode::DbWriteFailed => "DB_WRITE_FAILED",
            ErrorCode::FsWriteFailed => "FS_WRITE_FAILED",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The vault's unified error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("zip entry exceeds the single-file size limit: {0}")]
    ZipEntryTooLarge(String),

    #[error("zip archive exceeds the total uncompressed size limit: {0}")]
    ZipTotalTooLarge(String),

    #[error("zip archive has too many entries: {0}")]
    ZipTooManyEntries(String),

    #[error("zip archive is corrupt or unparseable: {0}")]
    ZipCorrupt(String),

    #[error("zip entry path traversal detected: {0}")]
    ZipSlipDetected(String),

    #[error("failed to parse JSON input: {0}")]
    ParseJsonFailed(String),

    #[error("failed to parse chat.html fallback: {0}")]
    ParseChatHtmlFailed(String),

    #[error("no message blocks matched in chat.html")]
    HtmlNoMessages,

    #[error("input is valid JSON but matches no known provider schema: {0}")]
    SchemaMismatch(String),

    #[error("database write failed: {0}")]
    DbWriteFailed(String),

    #[error("artifact filesystem write failed: {0}")]
    FsWriteFailed(String),

    #[error("path root was not initialized before use")]
    PathRootUninitialized,

    #[error("path root was already initialized")]
    PathRootAlreadyInitialized,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Maps this error to its stable wire code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ZipEntryTooLarge(_) => ErrorCode::ZipEntryTooLarge,
            Error::ZipTotalTooLarge(_) => ErrorCode::ZipTotalTooLarge,
            Error::ZipTooManyEntries(_) => ErrorCode::ZipTooManyEntries,
            Error::ZipCorrupt(_) => ErrorCode::ZipCorrupt,
            Error::ZipSlipDetected(_) => ErrorCode::ZipSlipDetected,
            Error::ParseJsonFailed(_) => ErrorCode::ParseJsonFailed,
            Error::ParseChatHtmlFailed(_) => ErrorCode::ParseChatHtmlFailed,
            Error::HtmlNoMessages => ErrorCode::HtmlNoMessages,
            Error::SchemaMismatch(_) => ErrorCode::SchemaMismatch,
            Error::DbWriteFailed(_) => ErrorCode::DbWriteFailed,
            Error::FsWriteFailed(_) => ErrorCode::FsWriteFailed,
            Error::PathRootUninitialized | Error::PathRootAlreadyInitialized => {
                ErrorCode::UnknownError
            }
            Error::Unknown(_) => ErrorCode::UnknownError,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::DbWriteFailed(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::FsWriteFailed(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ParseJsonFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_wire_strings() {
        assert_eq!(ErrorCode::ZipSlipDetected.as_str(), "ZIP_SLIP_DETECTED");
        assert_eq!(ErrorCode::HtmlNoMessages.as_str(), "HTML_NO_MESSAGES");
    }

    #[test]
    fn error_maps_to_expected_code() {
        let e = Error::SchemaMismatch("no mapping field".into());
        assert_eq!(e.code(), ErrorCode::SchemaMismatch);
    }
}
