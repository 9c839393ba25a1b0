//! Path resolution for the database and pattern directory.
//!
//! The database is global (`~/.patternsync/patterns.db`) so every working
//! directory sees the same record store; the pattern directory is local
//! (`./patterns` by default) so exports land next to the project being
//! worked on.
//!
//! Resolution priority, both paths: explicit flag, then environment
//! variable, then the default location.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment override for the database path.
pub const ENV_DB: &str = "PSYNC_DB";
/// Environment override for the pattern directory.
pub const ENV_DIR: &str = "PSYNC_DIR";

/// The global application directory, `~/.patternsync`.
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".patternsync"))
}

/// Resolve the database path.
///
/// Priority: explicit flag, `PSYNC_DB`, then `~/.patternsync/patterns.db`.
///
/// # Errors
///
/// Returns `Error::Config` if no home directory can be determined and
/// nothing more explicit was given.
pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_DB) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    global_dir()
        .map(|dir| dir.join("patterns.db"))
        .ok_or_else(|| {
            Error::Config("cannot determine home directory; pass --db or set PSYNC_DB".to_string())
        })
}

/// Resolve the pattern directory.
///
/// Priority: explicit flag, `PSYNC_DIR`, then `./patterns`.
#[must_use]
pub fn resolve_pattern_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(ENV_DIR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from("patterns")
}
