//! Staged import sessions for the two-phase upload flow.
//!
//! A staged batch lives in its own table, keyed by an opaque `imp_`-prefixed
//! token, and expires 30 minutes after creation. Expired rows are swept by
//! a cheap per-request pass; sweeping is idempotent and safe to skip.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::sync::codec::RawDraft;

/// Staged sessions expire 30 minutes after creation.
pub const SESSION_TTL_MS: i64 = 30 * 60 * 1000;

/// Whether a session created at `created_at` has expired as of `now`
/// (both Unix milliseconds).
#[must_use]
pub fn is_expired(created_at: i64, now: i64) -> bool {
    now - created_at >= SESSION_TTL_MS
}

/// A staged draft batch pending confirmation.
#[derive(Debug, Clone)]
pub struct StagedBatch {
    pub id: String,
    pub drafts: Vec<RawDraft>,
    pub created_at: i64,
}

/// Access to the `import_sessions` table.
pub struct SessionStore<'c> {
    conn: &'c Connection,
}

impl<'c> SessionStore<'c> {
    #[must_use]
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Stage a draft batch under a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be serialized or inserted.
    pub fn put(&self, drafts: &[RawDraft]) -> Result<String> {
        let id = format!("imp_{}", Uuid::new_v4().simple());
        let payload = serde_json::to_string(drafts)?;
        let created_at = Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO import_sessions (id, payload, created_at) VALUES (?1, ?2, ?3)",
            params![id, payload, created_at],
        )?;
        debug!(session = %id, drafts = drafts.len(), "staged import session");
        Ok(id)
    }

    /// Fetch a staged batch. An expired session reads as absent and its
    /// row is deleted on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error on a query failure or a corrupt payload.
    pub fn get(&self, id: &str) -> Result<Option<StagedBatch>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT payload, created_at FROM import_sessions WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((payload, created_at)) = row else {
            return Ok(None);
        };
        if is_expired(created_at, Utc::now().timestamp_millis()) {
            self.delete(id)?;
            return Ok(None);
        }
        let drafts: Vec<RawDraft> = serde_json::from_str(&payload)?;
        Ok(Some(StagedBatch {
            id: id.to_string(),
            drafts,
            created_at,
        }))
    }

    /// Delete a session. Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM import_sessions WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Delete every expired session; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn sweep_expired(&self) -> Result<usize> {
        let cutoff = Utc::now().timestamp_millis() - SESSION_TTL_MS;
        let n = self.conn.execute(
            "DELETE FROM import_sessions WHERE created_at <= ?1",
            params![cutoff],
        )?;
        if n > 0 {
            debug!(swept = n, "removed expired import sessions");
        }
        Ok(n)
    }
}
