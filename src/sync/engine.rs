//! The sync engine: reconciles the record store and the pattern directory.
//!
//! Detection is a pure read-only query; classifying a slug never mutates
//! either store. Reconciliation is explicit: `import_pattern` copies disk
//! into the database, `export_pattern` copies the database onto disk, and
//! trash/restore flip the per-store lifecycle flags with a best-effort,
//! partial, reported contract.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::Pattern;
use crate::store::{SqliteStore, StateFilter};
use crate::sync::codec::{self, PatternDraft, PatternFile};
use crate::sync::file::PatternDir;
use crate::sync::types::{
    ExportOutcome, ImportOutcome, SlugReport, SyncOptions, SyncStatus, TrashOutcome,
};

/// Reconciles two independently-mutable stores keyed by slug.
pub struct SyncEngine<'a> {
    store: &'a mut SqliteStore,
    dir: PatternDir,
    options: SyncOptions,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine with default options.
    #[must_use]
    pub fn new(store: &'a mut SqliteStore, dir: PatternDir) -> Self {
        Self::with_options(store, dir, SyncOptions::default())
    }

    /// Create an engine with explicit options.
    #[must_use]
    pub fn with_options(store: &'a mut SqliteStore, dir: PatternDir, options: SyncOptions) -> Self {
        Self { store, dir, options }
    }

    /// The pattern directory this engine works against.
    #[must_use]
    pub fn dir(&self) -> &PatternDir {
        &self.dir
    }

    /// Read access to the underlying record store.
    #[must_use]
    pub fn store(&self) -> &SqliteStore {
        self.store
    }

    /// Classify every slug's agreement state across the two stores.
    ///
    /// Record-store-driven classification runs first; the disk-only scan
    /// then covers slugs not already classified, so no slug is ever
    /// reported twice. The `trashed` flag mirrors the record store's
    /// soft-delete state independently of the status.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be listed.
    pub fn detect_unsynced(&self) -> Result<BTreeMap<String, SlugReport>> {
        // Live view of the directory; files that fail to decode are kept
        // with a note rather than silently dropped.
        let mut disk: BTreeMap<String, Option<PatternDraft>> = BTreeMap::new();
        for (slug, path) in self.dir.list_live()? {
            let draft = match std::fs::read(&path) {
                Ok(bytes) => match codec::decode_file(&bytes) {
                    Ok(draft) => Some(draft),
                    Err(e) => {
                        warn!(slug, error = %e, "pattern file does not decode");
                        None
                    }
                },
                Err(e) => {
                    warn!(slug, error = %e, "pattern file unreadable");
                    None
                }
            };
            disk.insert(slug, draft);
        }

        let trashed_slugs: HashSet<String> = self
            .store
            .list(StateFilter::Trashed)?
            .into_iter()
            .map(|p| p.slug)
            .collect();

        let db_filter = if self.options.include_trashed {
            StateFilter::All
        } else {
            StateFilter::Active
        };

        let mut report = BTreeMap::new();

        // Pass 1: record-store-driven classification.
        for row in self.store.list(db_filter)? {
            let (status, mut notes) = match disk.get(&row.slug) {
                None => (SyncStatus::MissingFromDisk, String::new()),
                Some(Some(draft)) => {
                    if codec::fingerprint(&draft.content) == codec::fingerprint(&row.content) {
                        (SyncStatus::InSync, String::new())
                    } else {
                        (SyncStatus::Outdated, String::new())
                    }
                }
                Some(None) => (
                    SyncStatus::Outdated,
                    "disk file does not decode".to_string(),
                ),
            };
            let trashed = trashed_slugs.contains(&row.slug);
            if trashed {
                if !notes.is_empty() {
                    notes.push_str("; ");
                }
                notes.push_str("trashed in database");
            }
            report.insert(
                row.slug.clone(),
                SlugReport {
                    title: row.title,
                    status,
                    trashed,
                    notes,
                },
            );
        }

        // Pass 2: disk-only slugs, excluding anything already classified.
        for (slug, draft) in disk {
            if report.contains_key(&slug) {
                continue;
            }
            let trashed = trashed_slugs.contains(&slug);
            let (title, notes) = match &draft {
                Some(d) => (
                    d.title.clone(),
                    if trashed {
                        "trashed in database".to_string()
                    } else {
                        String::new()
                    },
                ),
                None => (slug.clone(), "disk file does not decode".to_string()),
            };
            report.insert(
                slug,
                SlugReport {
                    title,
                    status: SyncStatus::MissingFromDb,
                    trashed,
                    notes,
                },
            );
        }

        Ok(report)
    }

    /// Copy the disk version of `slug` into the record store.
    ///
    /// Updates an existing row in place (preserving its id and lifecycle
    /// state) or inserts a new active record. Never touches the directory.
    /// Idempotent: repeated calls with no intervening change converge.
    ///
    /// # Errors
    ///
    /// `FileNotFound` if no live file exists, `InvalidPattern` if it does
    /// not decode, or a database error from the write.
    pub fn import_pattern(&mut self, slug: &str) -> Result<ImportOutcome> {
        let bytes = self.dir.read_live(slug)?;
        let draft = codec::decode_file(&bytes)?;

        match self.store.find_by_slug_any(&draft.slug)? {
            Some(existing) => {
                self.store
                    .update_content(existing.id, &draft.title, &draft.content)?;
                debug!(slug, "imported pattern (update)");
                Ok(ImportOutcome::Updated)
            }
            None => {
                self.store.insert(&draft.slug, &draft.title, &draft.content)?;
                debug!(slug, "imported pattern (insert)");
                Ok(ImportOutcome::Inserted)
            }
        }
    }

    /// Write the live record for `slug` to its canonical disk file.
    ///
    /// Skipped as `Unchanged` when the existing file already carries the
    /// same title and content fingerprint, which avoids `modified_at`
    /// churn on every sync pass.
    ///
    /// # Errors
    ///
    /// `PatternNotFound` if the record store has no live row for the slug,
    /// or an I/O error from the write.
    pub fn export_pattern(&mut self, slug: &str) -> Result<ExportOutcome> {
        let record = self
            .store
            .find_by_slug(slug)?
            .ok_or_else(|| Error::PatternNotFound { slug: slug.to_string() })?;

        if self.export_would_be_noop(&record) {
            debug!(slug, "export skipped, file unchanged");
            return Ok(ExportOutcome::Unchanged);
        }

        let file = PatternFile {
            slug: record.slug.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            modified_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let encoded = codec::encode(&file)?;
        self.dir.write_live(&record.slug, &encoded)?;
        Ok(ExportOutcome::Written)
    }

    /// Whether the existing live file already matches the record
    /// (title and content fingerprint; `modified_at` is ignored).
    fn export_would_be_noop(&self, record: &Pattern) -> bool {
        if !self.dir.exists_live(&record.slug) {
            return false;
        }
        let Ok(bytes) = self.dir.read_live(&record.slug) else {
            return false;
        };
        let Ok(existing) = codec::decode_file(&bytes) else {
            // Undecodable file: rewrite it
            return false;
        };
        existing.title == record.title
            && codec::fingerprint(&existing.content) == codec::fingerprint(&record.content)
    }

    /// Soft-delete `slug` on both sides.
    ///
    /// Both side effects are attempted even if one fails; a side with
    /// nothing to do is a successful no-op. Failures are collected, never
    /// dropped. The contract is best-effort and reported per side.
    pub fn trash_pattern(&mut self, slug: &str) -> TrashOutcome {
        let mut failures = Vec::new();

        // Record store side
        match self.store.find_by_slug_any(slug) {
            Ok(Some(record)) if !record.is_trashed() => {
                if let Err(e) = self.store.soft_delete(record.id) {
                    failures.push(format!("record store: {e}"));
                }
            }
            Ok(_) => {} // absent or already trashed
            Err(e) => failures.push(format!("record store: {e}")),
        }

        // Disk side
        if let Err(e) = self.dir.mark_deleted(slug) {
            failures.push(format!("file store: {e}"));
        }

        if failures.is_empty() {
            TrashOutcome::Applied
        } else {
            warn!(slug, ?failures, "trash completed partially");
            TrashOutcome::Partial(failures)
        }
    }

    /// Restore `slug` on both sides. Inverse of [`Self::trash_pattern`],
    /// same best-effort contract.
    pub fn restore_pattern(&mut self, slug: &str) -> TrashOutcome {
        let mut failures = Vec::new();

        match self.store.find_by_slug_any(slug) {
            Ok(Some(record)) if record.is_trashed() => {
                if let Err(e) = self.store.restore(record.id) {
                    failures.push(format!("record store: {e}"));
                }
            }
            Ok(_) => {}
            Err(e) => failures.push(format!("record store: {e}")),
        }

        if let Err(e) = self.dir.unmark_deleted(slug) {
            failures.push(format!("file store: {e}"));
        }

        if failures.is_empty() {
            TrashOutcome::Applied
        } else {
            warn!(slug, ?failures, "restore completed partially");
            TrashOutcome::Partial(failures)
        }
    }

    /// Trash each slug independently. One slug's failure never aborts the
    /// batch; results are reported per slug in input order.
    pub fn bulk_trash(&mut self, slugs: &[String]) -> Vec<(String, TrashOutcome)> {
        slugs
            .iter()
            .map(|slug| (slug.clone(), self.trash_pattern(slug)))
            .collect()
    }
}
