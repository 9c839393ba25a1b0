//! Pack command: bundle patterns into one uploadable JSON file.

use std::path::{Path, PathBuf};

use crate::cli::commands::open_store;
use crate::error::{Error, Result};
use crate::store::StateFilter;
use crate::sync::file::atomic_write;
use crate::sync::PatternFile;

/// Execute the pack command.
///
/// Writes the selected patterns (default: every active one) as a single
/// pretty-printed JSON array. The output round-trips through `upload`.
///
/// # Errors
///
/// Returns `PatternNotFound` if a named slug has no live record, or an
/// I/O error from the write.
pub fn execute(out: &Path, slugs: &[String], db: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db)?;

    let patterns = if slugs.is_empty() {
        store.list(StateFilter::Active)?
    } else {
        let mut selected = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let record = store
                .find_by_slug(slug)?
                .ok_or_else(|| Error::PatternNotFound { slug: slug.clone() })?;
            selected.push(record);
        }
        selected
    };

    let bundle: Vec<PatternFile> = patterns
        .into_iter()
        .map(|p| PatternFile {
            slug: p.slug,
            title: p.title,
            content: p.content,
            modified_at: None,
        })
        .collect();

    let mut encoded = serde_json::to_string_pretty(&bundle)?;
    encoded.push('\n');
    atomic_write(out, &encoded)?;

    if json {
        let output = serde_json::json!({
            "path": out.display().to_string(),
            "patterns": bundle.len(),
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Packed {} patterns into {}", bundle.len(), out.display());
    Ok(())
}
