//! Sync command implementations (per-slug or whole-store export/import).

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::commands::{open_store, pattern_dir};
use crate::cli::SyncCommands;
use crate::error::{Error, Result};
use crate::store::StateFilter;
use crate::sync::{ExportOutcome, ImportOutcome, SyncEngine, SyncOptions};

#[derive(Serialize, Default)]
struct ExportStats {
    written: usize,
    unchanged: usize,
    failed: usize,
    failures: Vec<String>,
}

#[derive(Serialize, Default)]
struct ImportStats {
    inserted: usize,
    updated: usize,
    failed: usize,
    failures: Vec<String>,
}

/// Execute sync commands.
///
/// # Errors
///
/// Returns an error when the slug selection is empty or a store cannot be
/// opened; per-slug failures are accumulated into the summary instead.
pub fn execute(
    command: &SyncCommands,
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    include_trashed: bool,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db)?;
    let mut engine = SyncEngine::with_options(
        &mut store,
        pattern_dir(dir),
        SyncOptions { include_trashed },
    );

    match command {
        SyncCommands::Export { slugs, all } => export(&mut engine, slugs, *all, json),
        SyncCommands::Import { slugs, all } => import(&mut engine, slugs, *all, json),
    }
}

fn export(engine: &mut SyncEngine, slugs: &[String], all: bool, json: bool) -> Result<()> {
    let targets = if all {
        engine
            .store()
            .list(StateFilter::Active)?
            .into_iter()
            .map(|p| p.slug)
            .collect()
    } else {
        require_slugs(slugs, "sync export")?
    };

    let mut stats = ExportStats::default();
    for slug in &targets {
        match engine.export_pattern(slug) {
            Ok(ExportOutcome::Written) => stats.written += 1,
            Ok(ExportOutcome::Unchanged) => stats.unchanged += 1,
            Err(e) => {
                stats.failed += 1;
                stats.failures.push(format!("{slug}: {e}"));
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    println!("Export complete: {}", engine.dir().root().display());
    println!("  Written:   {}", stats.written);
    println!("  Unchanged: {}", stats.unchanged);
    if stats.failed > 0 {
        println!("  {}    {}", "Failed:".red(), stats.failed);
        for failure in &stats.failures {
            println!("    {}", failure.red());
        }
    }
    Ok(())
}

fn import(engine: &mut SyncEngine, slugs: &[String], all: bool, json: bool) -> Result<()> {
    let targets = if all {
        engine
            .dir()
            .list_live()?
            .into_iter()
            .map(|(slug, _)| slug)
            .collect()
    } else {
        require_slugs(slugs, "sync import")?
    };

    let mut stats = ImportStats::default();
    for slug in &targets {
        match engine.import_pattern(slug) {
            Ok(ImportOutcome::Inserted) => stats.inserted += 1,
            Ok(ImportOutcome::Updated) => stats.updated += 1,
            Err(e) => {
                stats.failed += 1;
                stats.failures.push(format!("{slug}: {e}"));
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    println!("Import complete");
    println!("  Inserted: {}", stats.inserted);
    println!("  Updated:  {}", stats.updated);
    if stats.failed > 0 {
        println!("  {}   {}", "Failed:".red(), stats.failed);
        for failure in &stats.failures {
            println!("    {}", failure.red());
        }
    }
    Ok(())
}

fn require_slugs(slugs: &[String], command: &str) -> Result<Vec<String>> {
    if slugs.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "pass at least one slug or --all to `psync {command}`"
        )));
    }
    Ok(slugs.to_vec())
}
