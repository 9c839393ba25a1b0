//! Pattern directory: the filesystem side of the sync pair.
//!
//! The directory holds one `<slug>.json` file per live pattern and a
//! `<slug>.deleted.json` marker for each soft-deleted one. A marker and a
//! live file for the same slug are mutually exclusive; writes enforce this
//! by clearing a stale marker. All writes are atomic: temp file, fsync,
//! rename.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::slugify;

/// Suffix that marks a soft-deleted pattern file.
pub const DELETED_SUFFIX: &str = ".deleted.json";

/// A directory of per-slug pattern JSON files.
#[derive(Debug, Clone)]
pub struct PatternDir {
    root: PathBuf,
}

impl PatternDir {
    /// Wrap a directory path. Nothing is created until the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if missing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path of the live file for a slug.
    #[must_use]
    pub fn live_path(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{}.json", slugify(slug)))
    }

    /// Path of the soft-delete marker for a slug.
    #[must_use]
    pub fn deleted_path(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{}{DELETED_SUFFIX}", slugify(slug)))
    }

    /// Whether a live file exists for the slug.
    #[must_use]
    pub fn exists_live(&self, slug: &str) -> bool {
        self.live_path(slug).exists()
    }

    /// Whether a soft-delete marker exists for the slug.
    #[must_use]
    pub fn exists_deleted(&self, slug: &str) -> bool {
        self.deleted_path(slug).exists()
    }

    /// List live pattern files as `(slug, path)` pairs, sorted by slug.
    ///
    /// Marker files and non-JSON entries are excluded: this is the live
    /// view of the directory. A missing directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list_live(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(DELETED_SUFFIX) || !name.ends_with(".json") {
                continue;
            }
            let slug = name.trim_end_matches(".json").to_string();
            entries.push((slug, path));
        }
        entries.sort();
        Ok(entries)
    }

    /// Read the live file for a slug.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if there is no live file.
    pub fn read_live(&self, slug: &str) -> Result<Vec<u8>> {
        let path = self.live_path(slug);
        if !path.exists() {
            return Err(Error::FileNotFound { path });
        }
        Ok(fs::read(&path)?)
    }

    /// Write the live file for a slug atomically.
    ///
    /// Also removes a stale `.deleted.json` marker for the same slug so the
    /// mutual-exclusion invariant holds after the write. The directory is
    /// created on first need.
    ///
    /// # Errors
    ///
    /// Returns an error if any file operation fails.
    pub fn write_live(&self, slug: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.live_path(slug);
        atomic_write(&path, content)?;

        let marker = self.deleted_path(slug);
        if marker.exists() {
            fs::remove_file(&marker)?;
        }
        debug!(slug, path = %path.display(), "wrote pattern file");
        Ok(())
    }

    /// Rename the live file to its soft-delete marker form.
    ///
    /// Returns `false` if there is no live file (nothing to do).
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    pub fn mark_deleted(&self, slug: &str) -> Result<bool> {
        let live = self.live_path(slug);
        if !live.exists() {
            return Ok(false);
        }
        fs::rename(&live, self.deleted_path(slug))?;
        debug!(slug, "marked pattern file deleted");
        Ok(true)
    }

    /// Rename the soft-delete marker back to its live form.
    ///
    /// Returns `false` if there is no marker (nothing to do).
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    pub fn unmark_deleted(&self, slug: &str) -> Result<bool> {
        let marker = self.deleted_path(slug);
        if !marker.exists() {
            return Ok(false);
        }
        fs::rename(&marker, self.live_path(slug))?;
        debug!(slug, "restored pattern file");
        Ok(true)
    }
}

/// Write content to a file atomically.
///
/// Writes to a temporary sibling, fsyncs, then renames over the target.
/// If any step fails the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write to temp file
    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
    }

    // Atomic rename
    fs::rename(&temp_path, path)?;

    Ok(())
}
