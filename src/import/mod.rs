//! Batch import of uploaded pattern payloads.
//!
//! An upload is a JSON array (or single object) of pattern drafts. The
//! pipeline decodes it up front, then applies a per-record decision table
//! against the record store; one bad record never aborts the rest, and
//! every outcome lands in a structured [`ImportReport`]. The two-phase
//! variant stages the decoded batch in a session for a later confirm.

pub mod session;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::SqliteStore;
use crate::sync::codec::{self, PatternDraft, PatternFile, RawDraft};
use crate::sync::file::PatternDir;
use crate::sync::types::ExportOutcome;

pub use session::{SessionStore, StagedBatch, SESSION_TTL_MS};

/// Knobs for a single import run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Update existing records in place instead of skipping them.
    pub overwrite: bool,
    /// After the record-store pass, mirror each draft to its disk file.
    pub write_to_disk: bool,
}

/// Per-outcome counters for one import run.
///
/// Database and disk outcomes are tracked independently: a record can be
/// `overwritten` in the store and `disk_skipped` on disk in the same run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub db_failed: usize,
    pub disk_failed: usize,
    pub disk_skipped: usize,
    /// One message per failed record; never silently dropped.
    pub failures: Vec<String>,
}

impl ImportReport {
    /// Total drafts seen by the record-store pass.
    #[must_use]
    pub fn total(&self) -> usize {
        self.imported + self.skipped + self.overwritten + self.db_failed
    }

    /// Whether every draft landed without a failure on either side.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.db_failed == 0 && self.disk_failed == 0
    }
}

/// Applies uploaded draft batches to the record store and, optionally,
/// the pattern directory.
pub struct ImportPipeline<'a> {
    store: &'a mut SqliteStore,
    dir: PatternDir,
}

impl<'a> ImportPipeline<'a> {
    #[must_use]
    pub fn new(store: &'a mut SqliteStore, dir: PatternDir) -> Self {
        Self { store, dir }
    }

    /// Decode an uploaded payload and apply it in one step.
    ///
    /// A payload that is not valid JSON is rejected before any store
    /// mutation. Per-record problems are counted, not raised.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decode` for an unparseable payload.
    pub fn handle_upload(&mut self, raw: &[u8], options: ImportOptions) -> Result<ImportReport> {
        let drafts = codec::decode(raw)?;
        Ok(self.apply(drafts, options))
    }

    /// Decode an uploaded payload and stage it for a later confirm,
    /// without touching the record store.
    ///
    /// Expired sessions are swept opportunistically on each call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decode` for an unparseable payload, or a database
    /// error from staging.
    pub fn stage_upload(&mut self, raw: &[u8]) -> Result<String> {
        let drafts = codec::decode(raw)?;
        let sessions = SessionStore::new(self.store.conn());
        sessions.sweep_expired()?;
        sessions.put(&drafts)
    }

    /// Replay a staged batch through the decision table, then drop the
    /// session.
    ///
    /// # Errors
    ///
    /// `Error::SessionNotFound` for an unknown or expired session id.
    pub fn confirm(&mut self, session_id: &str, options: ImportOptions) -> Result<ImportReport> {
        let staged = {
            let sessions = SessionStore::new(self.store.conn());
            sessions.sweep_expired()?;
            let staged = sessions.get(session_id)?.ok_or_else(|| Error::SessionNotFound {
                id: session_id.to_string(),
            })?;
            sessions.delete(session_id)?;
            staged
        };
        debug!(session = session_id, drafts = staged.drafts.len(), "confirming staged import");
        Ok(self.apply(staged.drafts, options))
    }

    /// Run the per-record decision table over a decoded batch.
    fn apply(&mut self, drafts: Vec<RawDraft>, options: ImportOptions) -> ImportReport {
        let mut report = ImportReport::default();

        let mut valid = Vec::with_capacity(drafts.len());
        for raw in drafts {
            match raw.validate() {
                Ok(draft) => valid.push(draft),
                Err(e) => {
                    report.db_failed += 1;
                    report.failures.push(e.to_string());
                }
            }
        }

        for draft in &valid {
            match self.store.find_by_slug_any(&draft.slug) {
                Ok(Some(existing)) => {
                    if options.overwrite {
                        match self
                            .store
                            .update_content(existing.id, &draft.title, &draft.content)
                        {
                            Ok(()) => report.overwritten += 1,
                            Err(e) => {
                                report.db_failed += 1;
                                report.failures.push(format!("{}: {e}", draft.slug));
                            }
                        }
                    } else {
                        report.skipped += 1;
                    }
                }
                Ok(None) => match self.store.insert(&draft.slug, &draft.title, &draft.content) {
                    Ok(_) => report.imported += 1,
                    Err(e) => {
                        report.db_failed += 1;
                        report.failures.push(format!("{}: {e}", draft.slug));
                    }
                },
                Err(e) => {
                    report.db_failed += 1;
                    report.failures.push(format!("{}: {e}", draft.slug));
                }
            }
        }

        if options.write_to_disk {
            for draft in &valid {
                match self.mirror_to_disk(draft) {
                    Ok(ExportOutcome::Written) => {}
                    Ok(ExportOutcome::Unchanged) => report.disk_skipped += 1,
                    Err(e) => {
                        report.disk_failed += 1;
                        report.failures.push(format!("{} (disk): {e}", draft.slug));
                    }
                }
            }
        }

        report
    }

    /// Write one draft to its canonical disk file, skipping the write
    /// when the existing file already matches.
    fn mirror_to_disk(&self, draft: &PatternDraft) -> Result<ExportOutcome> {
        if self.dir.exists_live(&draft.slug) {
            let bytes = self.dir.read_live(&draft.slug)?;
            if let Ok(existing) = codec::decode_file(&bytes) {
                if existing.title == draft.title
                    && codec::fingerprint(&existing.content) == codec::fingerprint(&draft.content)
                {
                    return Ok(ExportOutcome::Unchanged);
                }
            }
        }
        let file = PatternFile {
            slug: draft.slug.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            modified_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let encoded = codec::encode(&file)?;
        self.dir.write_live(&draft.slug, &encoded)?;
        Ok(ExportOutcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UPLOAD: &str = r#"[{"slug":"hero","title":"Hero","content":"<p>Hi</p>"}]"#;

    fn pipeline_fixture() -> (SqliteStore, TempDir) {
        (SqliteStore::open_memory().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn test_upload_into_empty_store() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));

        let report = pipeline
            .handle_upload(UPLOAD.as_bytes(), ImportOptions::default())
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.overwritten, 0);
        assert_eq!(report.db_failed, 0);
        assert!(report.is_clean());

        // Repeating without overwrite skips
        let report = pipeline
            .handle_upload(UPLOAD.as_bytes(), ImportOptions::default())
            .unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_overwrite_updates_in_place() {
        let (mut store, tmp) = pipeline_fixture();
        store.insert("hero", "Old", "<p>old</p>").unwrap();
        let id = store.find_by_slug("hero").unwrap().unwrap().id;

        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));
        let report = pipeline
            .handle_upload(
                UPLOAD.as_bytes(),
                ImportOptions { overwrite: true, write_to_disk: false },
            )
            .unwrap();
        assert_eq!(report.overwritten, 1);
        assert_eq!(report.imported, 0);

        let row = store.find_by_slug("hero").unwrap().unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.title, "Hero");
        assert_eq!(row.content, "<p>Hi</p>");
    }

    #[test]
    fn test_invalid_draft_counts_as_db_failed() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));

        let report = pipeline
            .handle_upload(br#"[{"slug":"x"}]"#, ImportOptions::default())
            .unwrap();
        assert_eq!(report.db_failed, 1);
        assert_eq!(report.imported, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(store.find_by_slug_any("x").unwrap().is_none());
    }

    #[test]
    fn test_one_bad_record_does_not_block_the_rest() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));

        let raw = r#"[
            {"slug":"a","content":"<p>a</p>"},
            {"slug":"x"},
            {"slug":"b","content":"<p>b</p>"}
        ]"#;
        let report = pipeline
            .handle_upload(raw.as_bytes(), ImportOptions::default())
            .unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.db_failed, 1);
        assert!(store.find_by_slug("a").unwrap().is_some());
        assert!(store.find_by_slug("b").unwrap().is_some());
    }

    #[test]
    fn test_malformed_payload_rejected_before_mutation() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));

        assert!(matches!(
            pipeline.handle_upload(b"not json", ImportOptions::default()),
            Err(Error::Decode(_))
        ));
        assert_eq!(store.count(crate::store::StateFilter::All).unwrap(), 0);
    }

    #[test]
    fn test_legacy_key_names_accepted() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));

        let raw = r#"{"post_name":"hero","post_title":"Hero","post_content":"<p>Hi</p>"}"#;
        let report = pipeline
            .handle_upload(raw.as_bytes(), ImportOptions::default())
            .unwrap();
        assert_eq!(report.imported, 1);
        assert!(store.find_by_slug("hero").unwrap().is_some());
    }

    #[test]
    fn test_write_to_disk_tracks_disk_outcomes_separately() {
        let (mut store, tmp) = pipeline_fixture();
        let dir = PatternDir::new(tmp.path());
        let mut pipeline = ImportPipeline::new(&mut store, dir.clone());

        let options = ImportOptions { overwrite: true, write_to_disk: true };
        let report = pipeline.handle_upload(UPLOAD.as_bytes(), options).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.disk_skipped, 0);
        assert!(dir.exists_live("hero"));

        // Second run: overwritten in the store, unchanged on disk
        let report = pipeline.handle_upload(UPLOAD.as_bytes(), options).unwrap();
        assert_eq!(report.overwritten, 1);
        assert_eq!(report.disk_skipped, 1);
        assert_eq!(report.disk_failed, 0);
    }

    #[test]
    fn test_stage_then_confirm() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));

        let session_id = pipeline.stage_upload(UPLOAD.as_bytes()).unwrap();
        assert!(session_id.starts_with("imp_"));
        // Staging touched nothing
        assert!(pipeline.store.find_by_slug_any("hero").unwrap().is_none());

        let report = pipeline
            .confirm(&session_id, ImportOptions::default())
            .unwrap();
        assert_eq!(report.imported, 1);

        // The session is single-use
        assert!(matches!(
            pipeline.confirm(&session_id, ImportOptions::default()),
            Err(Error::SessionNotFound { .. })
        ));
    }

    #[test]
    fn test_confirm_unknown_session() {
        let (mut store, tmp) = pipeline_fixture();
        let mut pipeline = ImportPipeline::new(&mut store, PatternDir::new(tmp.path()));
        assert!(matches!(
            pipeline.confirm("imp_missing", ImportOptions::default()),
            Err(Error::SessionNotFound { .. })
        ));
    }
}
