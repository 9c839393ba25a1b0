//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Shells supported for completion generation.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// PatternSync CLI - keep a pattern database and a directory of JSON files in step
#[derive(Parser, Debug)]
#[command(name = "psync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.patternsync/patterns.db)
    #[arg(long, global = true, env = "PSYNC_DB")]
    pub db: Option<PathBuf>,

    /// Pattern directory (default: ./patterns)
    #[arg(long, global = true, env = "PSYNC_DIR")]
    pub dir: Option<PathBuf>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Include trashed records in sync comparison
    #[arg(long, global = true)]
    pub include_trashed: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the pattern database and directory
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// List patterns in the database
    List {
        /// Show trashed patterns instead of active ones
        #[arg(long, conflicts_with = "all")]
        trashed: bool,

        /// Show all patterns regardless of state
        #[arg(long)]
        all: bool,
    },

    /// Show sync status between the database and the pattern directory
    Status,

    /// Reconcile the database and the pattern directory
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },

    /// Move patterns to trash on both sides
    Trash {
        /// Slugs to trash
        #[arg(required = true)]
        slugs: Vec<String>,
    },

    /// Restore a trashed pattern on both sides
    Restore {
        /// Slug to restore
        slug: String,
    },

    /// Import a pattern payload file into the database
    Upload {
        /// Payload file: a JSON array of patterns or a single object
        file: PathBuf,

        /// Update existing patterns instead of skipping them
        #[arg(long)]
        overwrite: bool,

        /// Also mirror each pattern to its disk file
        #[arg(long)]
        write_to_disk: bool,
    },

    /// Stage a payload file for a later `confirm`
    Stage {
        /// Payload file: a JSON array of patterns or a single object
        file: PathBuf,
    },

    /// Apply a previously staged upload
    Confirm {
        /// Session id printed by `stage`
        session_id: String,

        /// Update existing patterns instead of skipping them
        #[arg(long)]
        overwrite: bool,

        /// Also mirror each pattern to its disk file
        #[arg(long)]
        write_to_disk: bool,
    },

    /// Write patterns as one JSON bundle suitable for `upload`
    Pack {
        /// Output file
        out: PathBuf,

        /// Slugs to include (default: all active patterns)
        slugs: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Write database patterns to their disk files
    Export {
        /// Slugs to export
        slugs: Vec<String>,

        /// Export every active pattern
        #[arg(long, conflicts_with = "slugs")]
        all: bool,
    },

    /// Read disk files into the database
    Import {
        /// Slugs to import
        slugs: Vec<String>,

        /// Import every live pattern file
        #[arg(long, conflicts_with = "slugs")]
        all: bool,
    },
}
