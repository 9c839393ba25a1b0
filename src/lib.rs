//! PatternSync: bidirectional synchronization between a SQLite pattern
//! store and a directory of per-slug JSON files.
//!
//! The two stores are peers. The database holds the editable records; the
//! directory holds their git-friendly disk twins. [`sync::SyncEngine`]
//! detects disagreement and reconciles it in either direction;
//! [`import::ImportPipeline`] applies uploaded batches, either immediately
//! or through a staged preview-then-confirm flow.
//!
//! The core returns typed results and never prints; all rendering lives in
//! [`cli`] and the `psync` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
