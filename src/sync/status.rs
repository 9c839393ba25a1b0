//! Sync status display.
//!
//! Turns a detection report into per-status counts and renders it to
//! stdout in a human-readable form. The raw report is what `--json`
//! serializes; these helpers only shape the terminal view.

use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;

use crate::sync::types::{SlugReport, SyncStatus};

/// Per-status counts over a detection report.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StatusSummary {
    pub in_sync: usize,
    pub outdated: usize,
    pub missing_from_disk: usize,
    pub missing_from_db: usize,
    pub trashed: usize,
}

impl StatusSummary {
    /// Total slugs needing attention (everything except `in_sync`).
    #[must_use]
    pub fn unsynced(&self) -> usize {
        self.outdated + self.missing_from_disk + self.missing_from_db
    }
}

/// Tally a detection report into per-status counts.
#[must_use]
pub fn summarize(report: &BTreeMap<String, SlugReport>) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for entry in report.values() {
        match entry.status {
            SyncStatus::InSync => summary.in_sync += 1,
            SyncStatus::Outdated => summary.outdated += 1,
            SyncStatus::MissingFromDisk => summary.missing_from_disk += 1,
            SyncStatus::MissingFromDb => summary.missing_from_db += 1,
        }
        if entry.trashed {
            summary.trashed += 1;
        }
    }
    summary
}

/// Print a detection report to stdout in a human-readable format.
pub fn print_status(report: &BTreeMap<String, SlugReport>) {
    let summary = summarize(report);

    println!("{}", "Pattern Sync Status".bold().underline());
    println!();

    if report.is_empty() {
        println!("{}", "No patterns found on either side.".dimmed());
        return;
    }

    if summary.unsynced() == 0 {
        println!(
            "{}",
            format!("All {} patterns in sync.", summary.in_sync).green()
        );
    } else {
        println!("{}", "Out of Sync:".yellow().bold());
        for (slug, entry) in report {
            if entry.status == SyncStatus::InSync {
                continue;
            }
            let mut line = format!("  {:<24} {}", slug, entry.status);
            if entry.trashed {
                line.push_str(" [trashed]");
            }
            if !entry.notes.is_empty() {
                line.push_str(&format!(" ({})", entry.notes));
            }
            match entry.status {
                SyncStatus::Outdated => println!("{}", line.yellow()),
                SyncStatus::MissingFromDisk | SyncStatus::MissingFromDb => {
                    println!("{}", line.red());
                }
                SyncStatus::InSync => {}
            }
        }
        println!();
        println!("  {}: {} of {}", "Unsynced".bold(), summary.unsynced(), report.len());
        println!();
        println!(
            "{}",
            "Run 'psync sync export' or 'psync sync import' to reconcile.".dimmed()
        );
    }

    if summary.in_sync > 0 && summary.unsynced() > 0 {
        println!("  {} in sync", summary.in_sync);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: SyncStatus, trashed: bool) -> SlugReport {
        SlugReport {
            title: "T".to_string(),
            status,
            trashed,
            notes: String::new(),
        }
    }

    #[test]
    fn test_summarize_counts_each_status() {
        let mut report = BTreeMap::new();
        report.insert("a".to_string(), entry(SyncStatus::InSync, false));
        report.insert("b".to_string(), entry(SyncStatus::Outdated, false));
        report.insert("c".to_string(), entry(SyncStatus::MissingFromDisk, true));
        report.insert("d".to_string(), entry(SyncStatus::MissingFromDb, false));

        let summary = summarize(&report);
        assert_eq!(summary.in_sync, 1);
        assert_eq!(summary.outdated, 1);
        assert_eq!(summary.missing_from_disk, 1);
        assert_eq!(summary.missing_from_db, 1);
        assert_eq!(summary.trashed, 1);
        assert_eq!(summary.unsynced(), 3);
    }

    #[test]
    fn test_summarize_empty_report() {
        let summary = summarize(&BTreeMap::new());
        assert_eq!(summary.unsynced(), 0);
        assert_eq!(summary.in_sync, 0);
    }
}
