//! Error types for the PatternSync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Partial failures of multi-step operations (trash/restore touch both the
//! record store and the disk twin) are not errors: they come back as
//! `sync::TrashOutcome::Partial` so the caller always sees per-step messages.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for PatternSync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    PatternNotFound,
    FileNotFound,
    SessionNotFound,

    // Validation (exit 4)
    DecodeError,
    InvalidPattern,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::PatternNotFound => "PATTERN_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::DecodeError => "DECODE_ERROR",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::PatternNotFound | Self::FileNotFound | Self::SessionNotFound => 3,
            Self::DecodeError | Self::InvalidPattern | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in PatternSync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `psync init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Pattern not found: {slug}")]
    PatternNotFound { slug: String },

    #[error("Pattern file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Import session not found or expired: {id}")]
    SessionNotFound { id: String },

    #[error("Invalid upload payload: {0}")]
    Decode(String),

    #[error("Invalid pattern{}: {message}", slug.as_deref().map(|s| format!(" '{s}'")).unwrap_or_default())]
    InvalidPattern {
        /// Slug, when one could be read from the payload.
        slug: Option<String>,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::PatternNotFound { .. } => ErrorCode::PatternNotFound,
            Self::FileNotFound { .. } => ErrorCode::FileNotFound,
            Self::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            Self::Decode(_) => ErrorCode::DecodeError,
            Self::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `psync init` to create the pattern database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::PatternNotFound { slug } => Some(format!(
                "No pattern with slug '{slug}'. Use `psync list` to see known patterns."
            )),

            Self::FileNotFound { .. } => {
                Some("Run `psync status` to see which slugs exist on disk.".to_string())
            }

            Self::SessionNotFound { .. } => Some(
                "Staged uploads expire 30 minutes after `psync stage`. \
                 Re-stage the file and confirm again."
                    .to_string(),
            ),

            Self::Decode(_) => Some(
                "The upload must be a JSON array of pattern objects or a single \
                 object with `slug` and `content` fields."
                    .to_string(),
            ),

            Self::InvalidPattern { .. } => Some(
                "Each pattern needs at least `slug` and `content` \
                 (`title` defaults to the slug)."
                    .to_string(),
            ),

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, exit code, and optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
