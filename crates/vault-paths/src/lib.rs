//! PathRoot: the process-wide, once-initialized resolution of the vault
//! directory layout.
//!
//! A second call to [`PathRoot::init`] is a programming error and fails
//! fast, as does calling [`PathRoot::get`] before any `init`. This shape
//! eliminates the class of bug where path values are captured before a
//! caller (a smoke run, a test harness) has had a chance to override the
//! user-data directory.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use vault_common::{Error, Result};

static PATH_ROOT: OnceLock<PathRoot> = OnceLock::new();

/// The frozen set of absolute paths the vault operates under.
#[derive(Debug, Clone)]
pub struct PathRoot {
    user_data: PathBuf,
    vault: PathBuf,
    db: PathBuf,
    artifacts: PathBuf,
}

impl PathRoot {
    fn new(user_data: PathBuf) -> Self {
        let vault = user_data.join("vault");
        let db = vault.join("vault.db");
        let artifacts = vault.join("artifacts");
        PathRoot {
            user_data,
            vault,
            db,
            artifacts,
        }
    }

    /// Initializes the process-wide path root from a caller-supplied
    /// user-data directory. Creates the vault and artifacts directories if
    /// they do not yet exist. Returns [`Error::PathRootAlreadyInitialized`]
    /// if called more than once in this process.
    pub fn init(user_data: impl Into<PathBuf>) -> Result<&'static PathRoot> {
        let root = PathRoot::new(user_data.into());
        std::fs::create_dir_all(&root.vault)?;
        std::fs::create_dir_all(&root.artifacts)?;
        PATH_ROOT
            .set(root)
            .map_err(|_| Error::PathRootAlreadyInitialized)?;
        Ok(PATH_ROOT.get().expect("just set"))
    }

    /// Returns the process-wide path root, or
    /// [`Error::PathRootUninitialized`] if [`PathRoot::init`] has not been
    /// called yet.
    pub fn get() -> Result<&'static PathRoot> {
        PATH_ROOT.get().ok_or(Error::PathRootUninitialized)
    }

    /// True if `init` has already run in this process.
    pub fn is_initialized() -> bool {
        PATH_ROOT.get().is_some()
    }

    pub fn user_data(&self) -> &Path {
        &self.user_data
    }

    pub fn vault(&self) -> &Path {
        &self.vault
    }

    pub fn db(&self) -> &Path {
        &self.db
    }

    pub fn artifacts(&self) -> &Path {
        &self.artifacts
    }
}
