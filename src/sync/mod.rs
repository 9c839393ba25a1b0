//! Bidirectional synchronization between the record store and a
//! directory of per-slug JSON pattern files.
//!
//! The database and the directory are peers. Neither side is assumed
//! authoritative; [`SyncEngine::detect_unsynced`] reports disagreement
//! and the import/export operations resolve it in whichever direction
//! the caller chooses.

pub mod codec;
pub mod engine;
pub mod file;
pub mod status;
pub mod types;

pub use codec::{decode, decode_file, encode, fingerprint, PatternDraft, PatternFile, RawDraft};
pub use engine::SyncEngine;
pub use file::PatternDir;
pub use status::{print_status, summarize, StatusSummary};
pub use types::{
    ExportOutcome, ImportOutcome, SlugReport, SyncOptions, SyncStatus, TrashOutcome,
};
