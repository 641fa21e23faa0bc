//! Configurable ZIP Safety Protocol limits, overridable by environment
//! variable primarily for tests.

/// Bounds applied during the archive pre-scan, before any entry is
/// extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipLimits {
    pub max_entries: u64,
    pub max_single_file_bytes: u64,
    pub max_total_uncompressed_bytes: u64,
    pub max_ratio: u64,
}

impl Default for ZipLimits {
    fn default() -> Self {
        ZipLimits {
            max_entries: 10_000,
            max_single_file_bytes: 100 * 1024 * 1024,
            max_total_uncompressed_bytes: 1024 * 1024 * 1024,
            max_ratio: 100,
        }
    }
}

impl ZipLimits {
    /// Reads `VAULT_ZIP_MAX_ENTRIES`, `VAULT_ZIP_MAX_SINGLE_FILE_BYTES`,
    /// `VAULT_ZIP_MAX_TOTAL_BYTES`, falling back to the default for any
    /// variable that is unset or unparseable. The ratio limit has no
    /// environment override and stays at its default.
    pub fn from_env() -> Self {
        let defaults = ZipLimits::default();
        ZipLimits {
            max_entries: env_u64("VAULT_ZIP_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            max_single_file_bytes: env_u64("VAULT_ZIP_MAX_SINGLE_FILE_BYTES")
                .unwrap_or(defaults.max_single_file_bytes),
            max_total_uncompressed_bytes: env_u64("VAULT_ZIP_MAX_TOTAL_BYTES")
                .unwrap_or(defaults.max_total_uncompressed_bytes),
            max_ratio: defaults.max_ratio,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
