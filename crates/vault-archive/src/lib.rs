//! The ZIP Safety Protocol: a bounded, atomic pre-scan of an untrusted
//! archive followed by an extraction loop that only ever runs after the
//! whole archive has passed.
//!
//! Verifies everything about the archive before acting on any of it —
//! the central directory is fully walked and checked before a single
//! byte is decompressed.

mod limits;
mod scan;

pub use limits::ZipLimits;
pub use scan::{EntryInfo, SafeZip};
