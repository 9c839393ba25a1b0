//! Upload commands: immediate import plus the staged two-phase flow.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::commands::{open_store, pattern_dir};
use crate::error::Result;
use crate::import::{ImportOptions, ImportPipeline, ImportReport};

/// Execute the upload command: decode and apply a payload in one step.
///
/// # Errors
///
/// Returns an error for an unreadable or unparseable payload file, or if
/// the stores cannot be opened.
pub fn execute_upload(
    file: &Path,
    overwrite: bool,
    write_to_disk: bool,
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let raw = std::fs::read(file)?;
    let mut store = open_store(db)?;
    let mut pipeline = ImportPipeline::new(&mut store, pattern_dir(dir));

    let report = pipeline.handle_upload(&raw, ImportOptions { overwrite, write_to_disk })?;
    render_report(&report, json)
}

/// Execute the stage command: decode and park a payload for `confirm`.
///
/// # Errors
///
/// Returns an error for an unreadable or unparseable payload file.
pub fn execute_stage(file: &Path, db: Option<&PathBuf>, dir: Option<&PathBuf>, json: bool) -> Result<()> {
    let raw = std::fs::read(file)?;
    let mut store = open_store(db)?;
    let mut pipeline = ImportPipeline::new(&mut store, pattern_dir(dir));

    let session_id = pipeline.stage_upload(&raw)?;

    if json {
        println!("{}", serde_json::json!({ "session_id": session_id }));
        return Ok(());
    }
    println!("Staged upload: {session_id}");
    println!("{}", "Run 'psync confirm <session-id>' within 30 minutes to apply.".dimmed());
    Ok(())
}

/// Execute the confirm command: apply a staged upload.
///
/// # Errors
///
/// Returns `SessionNotFound` for an unknown or expired session id.
pub fn execute_confirm(
    session_id: &str,
    overwrite: bool,
    write_to_disk: bool,
    db: Option<&PathBuf>,
    dir: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db)?;
    let mut pipeline = ImportPipeline::new(&mut store, pattern_dir(dir));

    let report = pipeline.confirm(session_id, ImportOptions { overwrite, write_to_disk })?;
    render_report(&report, json)
}

fn render_report(report: &ImportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!("Import result ({} patterns):", report.total());
    println!("  Imported:    {}", report.imported);
    println!("  Skipped:     {}", report.skipped);
    println!("  Overwritten: {}", report.overwritten);
    if report.disk_skipped > 0 {
        println!("  Disk unchanged: {}", report.disk_skipped);
    }
    if !report.is_clean() {
        println!(
            "  {} {} db, {} disk",
            "Failed:".red(),
            report.db_failed,
            report.disk_failed
        );
        for failure in &report.failures {
            println!("    {}", failure.red());
        }
    }
    Ok(())
}
