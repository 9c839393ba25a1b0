//! Initialize the pattern database and directory.

use std::path::PathBuf;

use serde::Serialize;

use crate::config;
use crate::error::{Error, Result};
use crate::store::SqliteStore;
use crate::sync::PatternDir;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    pattern_dir: PathBuf,
}

/// Execute the init command.
///
/// Creates the database (applying the schema) and the pattern directory.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the database exists and `--force` was
/// not given, or an error if either location cannot be created.
pub fn execute(
    force: bool,
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let db_path = config::resolve_db_path(db.map(PathBuf::as_path))?;
    let pattern_dir = config::resolve_pattern_dir(dir.map(PathBuf::as_path));

    if db_path.exists() {
        if !force {
            return Err(Error::AlreadyInitialized { path: db_path });
        }
        std::fs::remove_file(&db_path)?;
    }

    SqliteStore::open(&db_path)?;
    PatternDir::new(&pattern_dir).ensure_dir()?;

    if json {
        let output = InitOutput {
            database: db_path,
            pattern_dir,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Initialized pattern database: {}", db_path.display());
    println!("Pattern directory: {}", pattern_dir.display());
    Ok(())
}
