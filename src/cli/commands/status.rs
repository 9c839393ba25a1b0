//! Sync status command.

use std::path::PathBuf;

use crate::cli::commands::{open_store, pattern_dir};
use crate::error::Result;
use crate::sync::{print_status, summarize, SyncEngine, SyncOptions};

/// Execute the status command.
///
/// Detection is read-only: this never mutates either store.
///
/// # Errors
///
/// Returns an error if either store cannot be read.
pub fn execute(
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    include_trashed: bool,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db)?;
    let engine = SyncEngine::with_options(
        &mut store,
        pattern_dir(dir),
        SyncOptions { include_trashed },
    );
    let report = engine.detect_unsynced()?;

    if json {
        let output = serde_json::json!({
            "summary": summarize(&report),
            "patterns": report,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_status(&report);
    Ok(())
}
