//! List patterns in the database.

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::commands::open_store;
use crate::error::Result;
use crate::store::StateFilter;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or listed.
pub fn execute(trashed: bool, all: bool, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let filter = if all {
        StateFilter::All
    } else if trashed {
        StateFilter::Trashed
    } else {
        StateFilter::Active
    };

    let store = open_store(db)?;
    let patterns = store.list(filter)?;

    if json {
        println!("{}", serde_json::to_string(&patterns)?);
        return Ok(());
    }

    if patterns.is_empty() {
        println!("{}", "No patterns found.".dimmed());
        return Ok(());
    }

    println!("{:<28} {:<32} {}", "SLUG".bold(), "TITLE".bold(), "STATE".bold());
    for p in &patterns {
        let state = match p.state {
            crate::model::LifecycleState::Active => p.state.to_string().green(),
            crate::model::LifecycleState::Trashed => p.state.to_string().red(),
        };
        println!("{:<28} {:<32} {}", p.slug, p.title, state);
    }
    println!();
    println!("{} patterns", patterns.len());
    Ok(())
}
