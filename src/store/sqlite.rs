//! SQLite record store implementation.
//!
//! Implements the RecordStore side of the sync pair: list, find by slug,
//! insert, in-place update, soft delete and restore. Lifecycle changes are
//! soft: rows move between 'active' and 'trashed', nothing is erased.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::Result;
use crate::model::{LifecycleState, Pattern};
use crate::store::schema::apply_schema;

/// Row filter for listing patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    /// Live records only.
    #[default]
    Active,
    /// Soft-deleted records only.
    Trashed,
    /// Everything.
    All,
}

/// SQLite-based record store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection.
    ///
    /// Used by the import session store, which shares the database file but
    /// owns its own table and queries.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // ── Pattern operations ────────────────────────────────────

    /// List patterns matching the filter, ordered by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self, filter: StateFilter) -> Result<Vec<Pattern>> {
        let (sql, state) = match filter {
            StateFilter::Active => (
                "SELECT id, slug, title, content, state, created_at, updated_at
                 FROM patterns WHERE state = ?1 ORDER BY slug",
                Some("active"),
            ),
            StateFilter::Trashed => (
                "SELECT id, slug, title, content, state, created_at, updated_at
                 FROM patterns WHERE state = ?1 ORDER BY slug",
                Some("trashed"),
            ),
            StateFilter::All => (
                "SELECT id, slug, title, content, state, created_at, updated_at
                 FROM patterns ORDER BY slug",
                None,
            ),
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = match state {
            Some(s) => stmt.query_map(params![s], row_to_pattern)?,
            None => stmt.query_map([], row_to_pattern)?,
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Find a live pattern by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Pattern>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, slug, title, content, state, created_at, updated_at
                 FROM patterns WHERE slug = ?1 AND state = 'active'",
                params![slug],
                row_to_pattern,
            )
            .optional()?;
        Ok(found)
    }

    /// Find a pattern by slug regardless of lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_slug_any(&self, slug: &str) -> Result<Option<Pattern>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, slug, title, content, state, created_at, updated_at
                 FROM patterns WHERE slug = ?1",
                params![slug],
                row_to_pattern,
            )
            .optional()?;
        Ok(found)
    }

    /// Insert a new active pattern, returning its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including slug collisions).
    pub fn insert(&mut self, slug: &str, title: &str, content: &str) -> Result<i64> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO patterns (slug, title, content, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'active', ?4, ?4)",
            params![slug, title, content, now],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(slug, id, "inserted pattern");
        Ok(id)
    }

    /// Update title and content of an existing row, preserving its identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_content(&mut self, id: i64, title: &str, content: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "UPDATE patterns SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            params![title, content, now, id],
        )?;
        debug!(id, "updated pattern content");
        Ok(())
    }

    /// Mark a row soft-deleted. Returns false if it was not active.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn soft_delete(&mut self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        let changed = self.conn.execute(
            "UPDATE patterns SET state = 'trashed', updated_at = ?1
             WHERE id = ?2 AND state = 'active'",
            params![now, id],
        )?;
        Ok(changed > 0)
    }

    /// Restore a soft-deleted row. Returns false if it was not trashed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn restore(&mut self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        let changed = self.conn.execute(
            "UPDATE patterns SET state = 'active', updated_at = ?1
             WHERE id = ?2 AND state = 'trashed'",
            params![now, id],
        )?;
        Ok(changed > 0)
    }

    /// Count patterns matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self, filter: StateFilter) -> Result<usize> {
        let n: i64 = match filter {
            StateFilter::Active => self.conn.query_row(
                "SELECT COUNT(*) FROM patterns WHERE state = 'active'",
                [],
                |r| r.get(0),
            )?,
            StateFilter::Trashed => self.conn.query_row(
                "SELECT COUNT(*) FROM patterns WHERE state = 'trashed'",
                [],
                |r| r.get(0),
            )?,
            StateFilter::All => {
                self.conn
                    .query_row("SELECT COUNT(*) FROM patterns", [], |r| r.get(0))?
            }
        };
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

fn row_to_pattern(row: &Row<'_>) -> rusqlite::Result<Pattern> {
    let state_str: String = row.get(4)?;
    let state = state_str
        .parse::<LifecycleState>()
        .map_err(|e| rusqlite::Error::InvalidColumnType(4, e, rusqlite::types::Type::Text))?;
    Ok(Pattern {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        state,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(slugs: &[&str]) -> SqliteStore {
        let mut store = SqliteStore::open_memory().unwrap();
        for slug in slugs {
            store
                .insert(slug, &format!("Title {slug}"), &format!("<p>{slug}</p>"))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_insert_and_find() {
        let store = store_with(&["hero"]);
        let found = store.find_by_slug("hero").unwrap().unwrap();
        assert_eq!(found.title, "Title hero");
        assert_eq!(found.state, LifecycleState::Active);
        assert!(store.find_by_slug("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut store = store_with(&["hero"]);
        assert!(store.insert("hero", "Again", "c").is_err());
    }

    #[test]
    fn test_update_preserves_identity() {
        let mut store = store_with(&["hero"]);
        let before = store.find_by_slug("hero").unwrap().unwrap();
        store.update_content(before.id, "New Title", "<p>new</p>").unwrap();
        let after = store.find_by_slug("hero").unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, "New Title");
        assert_eq!(after.content, "<p>new</p>");
    }

    #[test]
    fn test_soft_delete_and_restore() {
        let mut store = store_with(&["hero"]);
        let id = store.find_by_slug("hero").unwrap().unwrap().id;

        assert!(store.soft_delete(id).unwrap());
        assert!(store.find_by_slug("hero").unwrap().is_none());
        let any = store.find_by_slug_any("hero").unwrap().unwrap();
        assert!(any.is_trashed());

        // Trashing again is a no-op
        assert!(!store.soft_delete(id).unwrap());

        assert!(store.restore(id).unwrap());
        assert!(store.find_by_slug("hero").unwrap().is_some());
        assert!(!store.restore(id).unwrap());
    }

    #[test]
    fn test_list_filters() {
        let mut store = store_with(&["a", "b", "c"]);
        let id = store.find_by_slug("b").unwrap().unwrap().id;
        store.soft_delete(id).unwrap();

        let active: Vec<_> = store
            .list(StateFilter::Active)
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(active, vec!["a", "c"]);

        let trashed: Vec<_> = store
            .list(StateFilter::Trashed)
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(trashed, vec!["b"]);

        assert_eq!(store.list(StateFilter::All).unwrap().len(), 3);
        assert_eq!(store.count(StateFilter::Active).unwrap(), 2);
        assert_eq!(store.count(StateFilter::Trashed).unwrap(), 1);
    }
}
