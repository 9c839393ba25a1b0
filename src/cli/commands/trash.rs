//! Trash and restore commands.
//!
//! Both operate on both stores with the best-effort contract: a partial
//! failure is reported per side, never silently collapsed into a boolean.

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::commands::{open_store, pattern_dir};
use crate::error::Result;
use crate::sync::{SyncEngine, TrashOutcome};

/// Execute the trash command over one or more slugs.
///
/// # Errors
///
/// Returns an error if the stores cannot be opened; per-slug partial
/// failures are rendered, not raised.
pub fn execute_trash(
    slugs: &[String],
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db)?;
    let mut engine = SyncEngine::new(&mut store, pattern_dir(dir));
    let results = engine.bulk_trash(slugs);

    if json {
        let output: Vec<_> = results
            .iter()
            .map(|(slug, outcome)| serde_json::json!({ "slug": slug, "result": outcome }))
            .collect();
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    for (slug, outcome) in &results {
        render_outcome(slug, "trashed", outcome);
    }
    Ok(())
}

/// Execute the restore command.
///
/// # Errors
///
/// Returns an error if the stores cannot be opened.
pub fn execute_restore(
    slug: &str,
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db)?;
    let mut engine = SyncEngine::new(&mut store, pattern_dir(dir));
    let outcome = engine.restore_pattern(slug);

    if json {
        let output = serde_json::json!({ "slug": slug, "result": outcome });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    render_outcome(slug, "restored", &outcome);
    Ok(())
}

fn render_outcome(slug: &str, verb: &str, outcome: &TrashOutcome) {
    match outcome {
        TrashOutcome::Applied => println!("{} {slug}", verb.green()),
        TrashOutcome::Partial(messages) => {
            println!("{} {slug}:", "partial".yellow());
            for message in messages {
                println!("  {}", message.yellow());
            }
        }
    }
}
