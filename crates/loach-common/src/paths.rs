use std::path::PathBuf;

/// Root data directory for loach.
///
/// Holds generated bundles and config backups. All of it is machine-local;
/// none of it should roam across machines.
///
/// - Linux: `~/.loach/`
/// - macOS: `~/Library/Application Support/loach/`
/// - Windows: `%LOCALAPPDATA%\loach\`
///
/// `LOACH_DATA_DIR` overrides the platform default (used by tests).
pub fn loach_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("LOACH_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("loach");
        }
    }

    #[cfg(windows)]
    {
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            return PathBuf::from(local).join("loach");
        }
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".loach");
        }
    }

    // Fallback
    PathBuf::from(".loach")
}

/// Directory where config backups are kept.
pub fn loach_backup_dir() -> PathBuf {
    loach_data_dir().join("backups")
}

/// Default location for the generated certificate bundle.
pub fn default_bundle_path() -> PathBuf {
    loach_data_dir().join("trust-bundle.pem")
}
