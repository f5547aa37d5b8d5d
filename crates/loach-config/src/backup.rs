//! Timestamped, append-only config backups.
//!
//! Backups are named `<sanitized-target>-<YYYYMMDD-HHMMSS>.bak` so the
//! lexicographically greatest filename is always the newest. Same-second
//! collisions get a `.N` suffix (which still sorts after the base name);
//! an existing backup is never overwritten.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::ConfigError;
use loach_common::persist::write_atomic;

/// Handle to a backup created for a specific target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRef {
    /// The config file the backup was taken from.
    pub target: PathBuf,
    /// Where the pre-mutation bytes live.
    pub path: PathBuf,
}

/// Matches the portion after `<sanitized>-` in a backup filename.
fn suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{8}-\d{6}\.bak(\.\d+)?$").expect("literal pattern"))
}

/// Flatten a target path into a filename-safe prefix. Path separators
/// and drive colons become `_` so backups of different targets never
/// collide.
fn sanitize_target(target: &Path) -> String {
    target
        .to_string_lossy()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect()
}

/// Copy the current bytes of `target` into a fresh backup file.
pub(crate) fn create_backup(target: &Path, backup_dir: &Path) -> Result<BackupRef, ConfigError> {
    let bytes = std::fs::read(target).map_err(|source| ConfigError::ReadFailed {
        path: target.to_path_buf(),
        source,
    })?;

    std::fs::create_dir_all(backup_dir)?;

    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let base = format!("{}-{stamp}.bak", sanitize_target(target));

    // Append-only: on a same-second collision, suffix with .2, .3, …
    let mut name = base.clone();
    let mut n = 1;
    while backup_dir.join(&name).exists() {
        n += 1;
        name = format!("{base}.{n}");
    }

    let path = backup_dir.join(name);
    write_atomic(&path, &bytes).map_err(|source| ConfigError::WriteFailed {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(target = %target.display(), backup = %path.display(), "Backup written");
    Ok(BackupRef {
        target: target.to_path_buf(),
        path,
    })
}

/// Newest backup for `target`, by filename, or `None`.
pub fn latest_backup(target: &Path, backup_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    if !backup_dir.is_dir() {
        return Ok(None);
    }

    let prefix = format!("{}-", sanitize_target(target));
    let mut newest: Option<String> = None;
    for entry in std::fs::read_dir(backup_dir)?.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(suffix) = name.strip_prefix(&prefix) else {
            continue;
        };
        if !suffix_pattern().is_match(suffix) {
            continue;
        }
        if newest.as_deref().map_or(true, |cur| name.as_str() > cur) {
            newest = Some(name);
        }
    }

    Ok(newest.map(|name| backup_dir.join(name)))
}

/// Restore `target` from its newest backup, overwriting the current file
/// verbatim. Returns the backup path that was applied.
pub fn restore(target: &Path, backup_dir: &Path) -> Result<PathBuf, ConfigError> {
    let Some(backup) = latest_backup(target, backup_dir)? else {
        return Err(ConfigError::NoBackup {
            target: target.to_path_buf(),
        });
    };

    let bytes = std::fs::read(&backup).map_err(|source| ConfigError::ReadFailed {
        path: backup.clone(),
        source,
    })?;
    write_atomic(target, &bytes).map_err(|source| ConfigError::WriteFailed {
        path: target.to_path_buf(),
        source,
    })?;

    tracing::info!(target = %target.display(), backup = %backup.display(), "Config restored from backup");
    Ok(backup)
}
