//! Reversible config patching for loach.
//!
//! Owns exactly one `key: value` directive in a line-oriented config
//! file (e.g. a package manager's rc file). Every other line passes
//! through byte-for-byte. Each mutation of an existing file is preceded
//! by a timestamped, append-only backup, and `restore` copies the newest
//! backup back verbatim.

use std::path::PathBuf;

mod backup;
mod directive;

pub use backup::{latest_backup, restore, BackupRef};
pub use directive::{apply_directive, preview_apply, remove_directive};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no backup found for {}", target.display())]
    NoBackup { target: PathBuf },

    #[error("unable to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
