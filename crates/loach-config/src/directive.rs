//! The directive patch engine.
//!
//! The config document is modeled as a sequence of raw lines; the one
//! recognized `key: value` directive is replaced (first occurrence) or
//! appended, and every other line passes through byte-for-byte. If the
//! directive appears more than once, later occurrences are left alone.

use std::path::Path;

use regex::Regex;

use crate::backup::{create_backup, BackupRef};
use crate::ConfigError;
use loach_common::persist::write_atomic;

/// Matcher for a directive line: optional leading whitespace, the key,
/// optional whitespace, a colon.
fn key_line_pattern(key: &str) -> Regex {
    let pattern = format!(r"^\s*{}\s*:", regex::escape(key));
    Regex::new(&pattern).expect("escaped key always compiles")
}

/// Replace the first `key:` line with `key: value`, or append one.
/// All other lines are preserved exactly, including their line endings.
fn patch_text(text: &str, key: &str, value: &str) -> String {
    let pattern = key_line_pattern(key);
    let directive = format!("{key}: {value}\n");

    let mut out = String::with_capacity(text.len() + directive.len());
    let mut replaced = false;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if !replaced && pattern.is_match(content) {
            out.push_str(&directive);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&directive);
    }
    out
}

/// Remove the first `key:` line, leaving everything else untouched.
/// Returns `None` if no directive line was found.
fn strip_text(text: &str, key: &str) -> Option<String> {
    let pattern = key_line_pattern(key);

    let mut out = String::with_capacity(text.len());
    let mut removed = false;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if !removed && pattern.is_match(content) {
            removed = true;
        } else {
            out.push_str(line);
        }
    }

    removed.then_some(out)
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> Result<(), ConfigError> {
    write_atomic(path, text.as_bytes()).map_err(|source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Set `key: value` in the config file at `path`.
///
/// A missing file is created with just the directive (no backup to take).
/// An existing file is backed up to `backup_dir` before the rewrite.
/// Applying the same `(key, value)` twice is idempotent: the second run
/// rewrites the file to identical bytes.
pub fn apply_directive(
    path: &Path,
    key: &str,
    value: &str,
    backup_dir: &Path,
) -> Result<Option<BackupRef>, ConfigError> {
    if !path.exists() {
        write_text(path, &format!("{key}: {value}\n"))?;
        tracing::info!(path = %path.display(), key, "Config created with directive");
        return Ok(None);
    }

    let text = read_text(path)?;
    let patched = patch_text(&text, key, value);

    let backup = create_backup(path, backup_dir)?;
    write_text(path, &patched)?;

    tracing::info!(path = %path.display(), key, "Directive applied");
    Ok(Some(backup))
}

/// Remove the `key:` directive from the config file at `path`.
///
/// A missing file or absent directive is a no-op (and takes no backup).
pub fn remove_directive(
    path: &Path,
    key: &str,
    backup_dir: &Path,
) -> Result<Option<BackupRef>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let text = read_text(path)?;
    let Some(stripped) = strip_text(&text, key) else {
        tracing::debug!(path = %path.display(), key, "Directive not present; nothing to remove");
        return Ok(None);
    };

    let backup = create_backup(path, backup_dir)?;
    write_text(path, &stripped)?;

    tracing::info!(path = %path.display(), key, "Directive removed");
    Ok(Some(backup))
}

/// Preview of what [`apply_directive`] would change, for dry runs.
/// Returns `(current, patched)` text; `current` is empty for a missing file.
pub fn preview_apply(path: &Path, key: &str, value: &str) -> Result<(String, String), ConfigError> {
    if !path.exists() {
        return Ok((String::new(), format!("{key}: {value}\n")));
    }
    let text = read_text(path)?;
    let patched = patch_text(&text, key, value);
    Ok((text, patched))
}
