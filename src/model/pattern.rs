//! Pattern model.
//!
//! A pattern is a named, sluggable content fragment. The slug is the join
//! key between the database and the on-disk JSON files and is immutable
//! once created; title and content are mutable.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pattern within one store.
///
/// The database side and the disk side each carry their own flag (a trashed
/// DB row, a `.deleted.json` marker file). The two are observed
/// independently; nothing keeps them atomically consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Live, visible record.
    Active,
    /// Soft-deleted, recoverable via restore.
    Trashed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Trashed => write!(f, "trashed"),
        }
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "trashed" => Ok(Self::Trashed),
            _ => Err(format!("Unknown lifecycle state: {s}")),
        }
    }
}

/// A pattern record in the database store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    /// Row identifier, preserved across in-place updates.
    pub id: i64,

    /// URL-safe unique identifier; the join key across both stores.
    pub slug: String,

    /// Human-readable title.
    pub title: String,

    /// Opaque markup payload. Compared via fingerprint, not byte-identity.
    pub content: String,

    /// Lifecycle state in the database store.
    pub state: LifecycleState,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Pattern {
    /// Whether the record is soft-deleted.
    #[must_use]
    pub fn is_trashed(&self) -> bool {
        self.state == LifecycleState::Trashed
    }
}

/// Normalize a slug to its URL-safe file-name-safe form.
///
/// Lowercases, maps whitespace and underscores to hyphens, drops everything
/// that is not alphanumeric or a hyphen, and collapses hyphen runs. Applied
/// at every boundary where a slug arrives from outside (uploads, CLI args)
/// before it is used as a key or a file name.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_hyphen = true; // suppress leading hyphens
    for c in raw.trim().chars() {
        let mapped = if c.is_ascii_alphanumeric() {
            Some(c.to_ascii_lowercase())
        } else if c.is_whitespace() || c == '_' || c == '-' {
            Some('-')
        } else {
            None
        };
        match mapped {
            Some('-') => {
                if !last_hyphen {
                    out.push('-');
                    last_hyphen = true;
                }
            }
            Some(c) => {
                out.push(c);
                last_hyphen = false;
            }
            None => {}
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
