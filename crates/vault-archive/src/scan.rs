use std::io::{Cursor, Read};

use tracing::{debug, warn};
use vault_common::{Error, Result};

use crate::limits::ZipLimits;

/// Metadata for one non-directory archive entry, gathered during the
/// pre-scan from the central-directory header — no entry is decompressed
/// at this stage.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// The raw, unnormalized name as stored in the archive.
    pub name: String,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
}

/// A ZIP archive that has passed the full Safety Protocol pre-scan:
/// entry-count bound, per-entry and total size bounds, ratio-bomb bound,
/// and path-traversal check. Holding a `SafeZip` is the type-level proof
/// that extraction may proceed.
pub struct SafeZip {
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
    pub entries: Vec<EntryInfo>,
}

impl SafeZip {
    /// Runs the pre-scan and returns a `SafeZip` ready for extraction, or
    /// the first violated limit as an `Error`.
    pub fn open(bytes: Vec<u8>, limits: &ZipLimits) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| Error::ZipCorrupt(format!("failed to read central directory: {e}")))?;

        let entry_count = archive.len() as u64;
        if entry_count > limits.max_entries {
            return Err(Error::ZipTooManyEntries(format!(
                "{entry_count} entries exceeds limit of {}",
                limits.max_entries
            )));
        }

        let mut entries = Vec::with_capacity(archive.len());
        let mut total_uncompressed: u64 = 0;

        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|e| Error::ZipCorrupt(format!("entry {i} unreadable: {e}")))?;

            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let uncompressed_size = entry.size();
            let compressed_size = entry.compressed_size();
            drop(entry);

            check_path_traversal(&name)?;

            if uncompressed_size > limits.max_single_file_bytes {
                return Err(Error::ZipEntryTooLarge(format!(
                    "entry {name} declares {uncompressed_size} bytes, exceeds limit of {}",
                    limits.max_single_file_bytes
                )));
            }

            if compressed_size > 0 {
                let ratio = uncompressed_size / compressed_size.max(1);
                if ratio > limits.max_ratio {
                    return Err(Error::ZipCorrupt(format!(
                        "entry {name} has compression ratio {ratio}, exceeds limit of {} (ratio-bomb class)",
                        limits.max_ratio
                    )));
                }
            } else if uncompressed_size > 0 {
                return Err(Error::ZipCorrupt(format!(
                    "entry {name} declares zero compressed size with nonzero uncompressed size"
                )));
            }

            total_uncompressed = total_uncompressed.saturating_add(uncompressed_size);
            if total_uncompressed > limits.max_total_uncompressed_bytes {
                return Err(Error::ZipTotalTooLarge(format!(
                    "running total {total_uncompressed} exceeds limit of {}",
                    limits.max_total_uncompressed_bytes
                )));
            }

            entries.push(EntryInfo {
                name,
                uncompressed_size,
                compressed_size,
            });
        }

        debug!(entries = entries.len(), total_uncompressed, "zip pre-scan passed");
        Ok(SafeZip { archive, entries })
    }

    /// Decompresses the entry at `index` (an index into `self.entries`,
    /// which only contains non-directory entries that survived the
    /// pre-scan). Returns `(name, bytes)`.
    pub fn extract(&mut self, index: usize) -> Result<(String, Vec<u8>)> {
        let info = self
            .entries
            .get(index)
            .ok_or_else(|| Error::Unknown(format!("no such pre-scanned entry: {index}")))?
            .clone();

        // Re-locate by name since indices into the underlying archive may
        // include directory entries the pre-scan skipped.
        let mut file = self
            .archive
            .by_name(&info.name)
            .map_err(|e| Error::ZipCorrupt(format!("entry {} vanished: {e}", info.name)))?;

        let mut buf = Vec::with_capacity(info.uncompressed_size as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| Error::ZipCorrupt(format!("failed to decompress {}: {e}", info.name)))?;

        Ok((info.name, buf))
    }
}

/// Checks the raw entry name for `..` components or absolute paths. This
/// must run on the name exactly as stored in the header — normalizing
/// first (e.g. via `Path::components()` collapsing) would resolve `..`
/// away and defeat the check.
fn check_path_traversal(raw_name: &str) -> Result<()> {
    if raw_name.starts_with('/') || raw_name.starts_with('\\') {
        warn!(name = raw_name, "zip slip: absolute entry path");
        return Err(Error::ZipSlipDetected(format!(
            "entry name is absolute: {raw_name}"
        )));
    }

    // Windows drive-letter absolute paths, e.g. "C:\evil".
    if raw_name.len() >= 2 && raw_name.as_bytes()[1] == b':' {
        warn!(name = raw_name, "zip slip: drive-letter absolute entry path");
        return Err(Error::ZipSlipDetected(format!(
            "entry name is absolute: {raw_name}"
        )));
    }

    for component in raw_name.split(['/', '\\']) {
        if component == ".." {
            warn!(name = raw_name, "zip slip: .. component in entry path");
            return Err(Error::ZipSlipDetected(format!(
                "entry name contains a '..' component: {raw_name}"
            )));
        }
    }

    Ok(())
}
