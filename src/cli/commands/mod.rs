//! Command implementations.
//!
//! Handlers are thin: resolve paths, open the stores, call into the core,
//! render the typed result. Session sweeping piggybacks on store opening so
//! every command opportunistically clears expired staged imports.

pub mod completions;
pub mod init;
pub mod list;
pub mod pack;
pub mod status;
pub mod sync;
pub mod trash;
pub mod upload;
pub mod version;

use std::path::PathBuf;

use crate::config;
use crate::error::{Error, Result};
use crate::import::SessionStore;
use crate::store::SqliteStore;
use crate::sync::PatternDir;

/// Open the record store, requiring a prior `psync init`.
pub(crate) fn open_store(db: Option<&PathBuf>) -> Result<SqliteStore> {
    let path = config::resolve_db_path(db.map(PathBuf::as_path))?;
    if !path.exists() {
        return Err(Error::NotInitialized);
    }
    let store = SqliteStore::open(&path)?;
    // Cheap, idempotent; safe to repeat or skip
    SessionStore::new(store.conn()).sweep_expired()?;
    Ok(store)
}

/// Resolve the pattern directory for this invocation.
pub(crate) fn pattern_dir(dir: Option<&PathBuf>) -> PatternDir {
    PatternDir::new(config::resolve_pattern_dir(dir.map(PathBuf::as_path)))
}
