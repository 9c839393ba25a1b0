//! Types shared by the sync engine and its callers.

use serde::Serialize;

/// Derived agreement state of one slug across the two stores.
///
/// Computed fresh on every detection pass, never stored. Historically
/// "orphaned" was used interchangeably with `missing_from_db`; it is
/// accepted when parsing but never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Present in both stores with matching fingerprints.
    InSync,
    /// Present in both stores, fingerprints differ.
    Outdated,
    /// Present in the record store only.
    MissingFromDisk,
    /// Present in the file store only.
    MissingFromDb,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InSync => write!(f, "in_sync"),
            Self::Outdated => write!(f, "outdated"),
            Self::MissingFromDisk => write!(f, "missing_from_disk"),
            Self::MissingFromDb => write!(f, "missing_from_db"),
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_sync" => Ok(Self::InSync),
            "outdated" => Ok(Self::Outdated),
            "missing_from_disk" => Ok(Self::MissingFromDisk),
            // "orphaned" is the legacy name for file-store-only slugs
            "missing_from_db" | "orphaned" => Ok(Self::MissingFromDb),
            _ => Err(format!("Unknown sync status: {s}")),
        }
    }
}

/// Per-slug detection result.
#[derive(Debug, Clone, Serialize)]
pub struct SlugReport {
    /// Title, taken from whichever store holds the slug (record store wins).
    pub title: String,
    /// Agreement state between the two stores.
    pub status: SyncStatus,
    /// Whether the record store holds this slug soft-deleted,
    /// independent of `status`.
    pub trashed: bool,
    /// Free-form annotation for display ("trashed in database", ...).
    pub notes: String,
}

/// Options for a sync engine instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Include trashed record-store rows in the disk comparison.
    ///
    /// Off by default: only live rows are compared, and a trashed row's
    /// live disk twin reports as `missing_from_db` with `trashed: true`.
    pub include_trashed: bool,
}

/// Result of importing one slug from disk into the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    /// A new active record was created.
    Inserted,
    /// An existing record was updated in place.
    Updated,
}

/// Result of exporting one slug from the record store to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportOutcome {
    /// The file was written (and `modified_at` stamped).
    Written,
    /// The existing file already matches; nothing was touched.
    Unchanged,
}

/// Result of a trash or restore operation.
///
/// Both side effects (record store flag, disk rename) are attempted
/// independently; this carries whatever failed. Best-effort, partial,
/// reported per step, never transactional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "messages")]
pub enum TrashOutcome {
    /// Every applicable step succeeded (absent sides are no-ops).
    Applied,
    /// At least one step failed; each failure has a message.
    Partial(Vec<String>),
}

impl TrashOutcome {
    /// Whether every step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            SyncStatus::InSync,
            SyncStatus::Outdated,
            SyncStatus::MissingFromDisk,
            SyncStatus::MissingFromDb,
        ] {
            let parsed: SyncStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_orphaned_is_a_parse_synonym_only() {
        let parsed: SyncStatus = "orphaned".parse().unwrap();
        assert_eq!(parsed, SyncStatus::MissingFromDb);
        // Never emitted under the legacy name
        assert_eq!(parsed.to_string(), "missing_from_db");
    }

    #[test]
    fn test_trash_outcome_completeness() {
        assert!(TrashOutcome::Applied.is_complete());
        assert!(!TrashOutcome::Partial(vec!["db: locked".into()]).is_complete());
    }
}
