//! SQLite storage layer for PatternSync.
//!
//! The record store is the database side of the sync pair. It holds the
//! canonical pattern rows plus the staged import sessions table.
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, StateFilter};
