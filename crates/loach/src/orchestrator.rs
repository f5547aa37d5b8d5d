//! Pipeline sequencing for the three invocation modes.
//!
//! Apply runs reader → chain → bundle → optional config patch; the
//! config file is touched last so a failed bundle write never leaves it
//! pointing at a bundle that failed to materialize. DryRun runs the same
//! resolution but writes nothing at all, the bundle included. Rollback
//! restores the config from its newest backup and can purge the
//! generated bundle. Modes are explicit — there is no inference.

use std::path::PathBuf;

use serde::Serialize;

use loach_config::{apply_directive, preview_apply, restore};
use loach_truststore::{find_anchors, resolve_intermediates, write_bundle, ChainSet, TrustStore};

/// Resolved apply-mode options, one struct instead of per-variant
/// flag plumbing.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub patterns: Vec<String>,
    pub bundle_path: PathBuf,
    /// `None` skips config patching entirely.
    pub config_path: Option<PathBuf>,
    pub key: String,
    pub backup_dir: PathBuf,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct RollbackOptions {
    pub config_path: PathBuf,
    pub backup_dir: PathBuf,
    /// Delete this bundle file after the restore, when set.
    pub purge_bundle: Option<PathBuf>,
}

/// What an apply (or dry run) did, or would do.
#[derive(Debug, Serialize)]
pub struct ApplySummary {
    pub dry_run: bool,
    pub roots: Vec<String>,
    pub intermediates: Vec<String>,
    pub bundle_path: PathBuf,
    pub bundle_bytes: usize,
    /// Unified-style line preview of the config change (dry run only).
    pub config_diff: Option<Vec<String>>,
    pub config_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RollbackSummary {
    pub config_path: PathBuf,
    pub restored_from: PathBuf,
    pub purged_bundle: Option<PathBuf>,
}

pub fn run_apply(store: &dyn TrustStore, opts: &ApplyOptions) -> anyhow::Result<ApplySummary> {
    let roots = find_anchors(store, &opts.patterns)?;
    let intermediates = resolve_intermediates(store, &roots)?;
    let chain = ChainSet::assemble(roots, intermediates);

    let subjects = |anchors: &[loach_truststore::TrustAnchor]| {
        anchors.iter().map(|a| a.subject.clone()).collect::<Vec<_>>()
    };
    let root_subjects = subjects(chain.roots());
    let intermediate_subjects = subjects(chain.intermediates());
    let bundle_bytes = loach_truststore::render_bundle(&chain).len();

    if opts.dry_run {
        let config_diff = match &opts.config_path {
            Some(path) => {
                let (current, patched) =
                    preview_apply(path, &opts.key, &opts.bundle_path.to_string_lossy())?;
                Some(preview_diff(&current, &patched))
            }
            None => None,
        };
        tracing::info!(
            certs = chain.len(),
            bundle = %opts.bundle_path.display(),
            "Dry run: nothing written"
        );
        return Ok(ApplySummary {
            dry_run: true,
            roots: root_subjects,
            intermediates: intermediate_subjects,
            bundle_path: opts.bundle_path.clone(),
            bundle_bytes,
            config_diff,
            config_path: opts.config_path.clone(),
            backup_path: None,
        });
    }

    // Bundle first; config last.
    write_bundle(&chain, &opts.bundle_path)?;

    let backup_path = match &opts.config_path {
        Some(path) => apply_directive(
            path,
            &opts.key,
            &opts.bundle_path.to_string_lossy(),
            &opts.backup_dir,
        )?
        .map(|backup| backup.path),
        None => None,
    };

    Ok(ApplySummary {
        dry_run: false,
        roots: root_subjects,
        intermediates: intermediate_subjects,
        bundle_path: opts.bundle_path.clone(),
        bundle_bytes,
        config_diff: None,
        config_path: opts.config_path.clone(),
        backup_path,
    })
}

pub fn run_rollback(opts: &RollbackOptions) -> anyhow::Result<RollbackSummary> {
    let restored_from = restore(&opts.config_path, &opts.backup_dir)?;

    let purged_bundle = match &opts.purge_bundle {
        Some(bundle) => match std::fs::remove_file(bundle) {
            Ok(()) => {
                tracing::info!(path = %bundle.display(), "Generated bundle deleted");
                Some(bundle.clone())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    Ok(RollbackSummary {
        config_path: opts.config_path.clone(),
        restored_from,
        purged_bundle,
    })
}

/// Line preview of a config rewrite. The patch engine changes at most
/// one line (or appends one), so a positional scan is sufficient.
fn preview_diff(current: &str, patched: &str) -> Vec<String> {
    let cur: Vec<&str> = current.lines().collect();
    let new: Vec<&str> = patched.lines().collect();

    let mut out = Vec::new();
    for i in 0..cur.len().max(new.len()) {
        match (cur.get(i), new.get(i)) {
            (Some(a), Some(b)) if a == b => {}
            (a, b) => {
                if let Some(a) = a {
                    out.push(format!("- {a}"));
                }
                if let Some(b) = b {
                    out.push(format!("+ {b}"));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use loach_truststore::{MemoryStore, TrustAnchor};
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("loach-orch-{name}-{nanos}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn anchor(subject: &str, cn: Option<&str>, issuer: &str, tag: u8) -> TrustAnchor {
        TrustAnchor {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
            common_name: cn.map(str::to_string),
            thumbprint: format!("{tag:02x}"),
            der: vec![tag; 16],
        }
    }

    fn acme_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_root(anchor(
            "CN=Acme Root CA",
            Some("Acme Root CA"),
            "CN=Acme Root CA",
            1,
        ));
        store.add_intermediate(anchor(
            "CN=Acme Issuing CA",
            Some("Acme Issuing CA"),
            "CN=Acme Root CA",
            2,
        ));
        store
    }

    fn options(dir: &Path, config: Option<PathBuf>, dry_run: bool) -> ApplyOptions {
        ApplyOptions {
            patterns: vec!["*Acme Root*".to_string()],
            bundle_path: dir.join("bundle.pem"),
            config_path: config,
            key: "ssl_verify".to_string(),
            backup_dir: dir.join("backups"),
            dry_run,
        }
    }

    #[test]
    fn apply_writes_bundle_and_patches_config() {
        let dir = temp_dir("apply");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();

        let summary = run_apply(&acme_store(), &options(&dir, Some(config.clone()), false)).unwrap();

        assert_eq!(summary.roots, vec!["CN=Acme Root CA"]);
        assert_eq!(summary.intermediates, vec!["CN=Acme Issuing CA"]);

        let bundle = std::fs::read_to_string(dir.join("bundle.pem")).unwrap();
        assert_eq!(bundle.matches("-----BEGIN CERTIFICATE-----").count(), 2);

        let patched = std::fs::read_to_string(&config).unwrap();
        assert!(patched.starts_with("proxy: foo\n"));
        assert!(patched.contains("ssl_verify: "));
        assert!(patched.trim_end().ends_with("bundle.pem"));

        let backup = summary.backup_path.expect("backup for existing config");
        assert_eq!(std::fs::read(backup).unwrap(), b"proxy: foo\n");
    }

    #[test]
    fn apply_without_config_path_skips_patching() {
        let dir = temp_dir("no-config");
        let summary = run_apply(&acme_store(), &options(&dir, None, false)).unwrap();
        assert!(summary.backup_path.is_none());
        assert!(dir.join("bundle.pem").exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = temp_dir("dry");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();

        let summary = run_apply(&acme_store(), &options(&dir, Some(config.clone()), true)).unwrap();

        assert!(summary.dry_run);
        assert!(!dir.join("bundle.pem").exists());
        assert!(!dir.join("backups").exists());
        assert_eq!(std::fs::read_to_string(&config).unwrap(), "proxy: foo\n");

        let diff = summary.config_diff.unwrap();
        assert_eq!(diff.len(), 1);
        assert!(diff[0].starts_with("+ ssl_verify: "));
    }

    #[test]
    fn no_match_aborts_before_any_write() {
        let dir = temp_dir("nomatch");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();

        let err =
            run_apply(&MemoryStore::new(), &options(&dir, Some(config.clone()), false)).unwrap_err();
        assert!(err.to_string().contains("no trust anchors matched"));
        assert!(!dir.join("bundle.pem").exists());
        assert_eq!(std::fs::read_to_string(&config).unwrap(), "proxy: foo\n");
    }

    #[test]
    fn failed_bundle_write_leaves_config_untouched() {
        let dir = temp_dir("badbundle");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();

        // Parent of the bundle path is a file, so the write must fail.
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let mut opts = options(&dir, Some(config.clone()), false);
        opts.bundle_path = blocker.join("bundle.pem");

        assert!(run_apply(&acme_store(), &opts).is_err());
        assert_eq!(std::fs::read_to_string(&config).unwrap(), "proxy: foo\n");
        assert!(!dir.join("backups").exists());
    }

    #[test]
    fn rollback_restores_and_purges() {
        let dir = temp_dir("rollback");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();

        let opts = options(&dir, Some(config.clone()), false);
        run_apply(&acme_store(), &opts).unwrap();
        assert_ne!(std::fs::read_to_string(&config).unwrap(), "proxy: foo\n");

        let summary = run_rollback(&RollbackOptions {
            config_path: config.clone(),
            backup_dir: dir.join("backups"),
            purge_bundle: Some(dir.join("bundle.pem")),
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(&config).unwrap(), "proxy: foo\n");
        assert_eq!(summary.purged_bundle, Some(dir.join("bundle.pem")));
        assert!(!dir.join("bundle.pem").exists());
    }

    #[test]
    fn rollback_with_missing_bundle_is_not_an_error() {
        let dir = temp_dir("purge-missing");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();
        run_apply(&acme_store(), &options(&dir, Some(config.clone()), false)).unwrap();
        std::fs::remove_file(dir.join("bundle.pem")).unwrap();

        let summary = run_rollback(&RollbackOptions {
            config_path: config,
            backup_dir: dir.join("backups"),
            purge_bundle: Some(dir.join("bundle.pem")),
        })
        .unwrap();
        assert!(summary.purged_bundle.is_none());
    }

    #[test]
    fn rollback_without_backups_fails() {
        let dir = temp_dir("nobackup");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();

        let err = run_rollback(&RollbackOptions {
            config_path: config.clone(),
            backup_dir: dir.join("backups"),
            purge_bundle: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("no backup found"));
        assert_eq!(std::fs::read_to_string(&config).unwrap(), "proxy: foo\n");
    }

    #[test]
    fn repeated_apply_is_idempotent_end_to_end() {
        let dir = temp_dir("idem");
        let config = dir.join("condarc");
        std::fs::write(&config, "proxy: foo\n").unwrap();
        let opts = options(&dir, Some(config.clone()), false);

        run_apply(&acme_store(), &opts).unwrap();
        let bundle_first = std::fs::read(dir.join("bundle.pem")).unwrap();
        let config_first = std::fs::read(&config).unwrap();

        run_apply(&acme_store(), &opts).unwrap();
        assert_eq!(std::fs::read(dir.join("bundle.pem")).unwrap(), bundle_first);
        assert_eq!(std::fs::read(&config).unwrap(), config_first);
    }

    #[test]
    fn preview_diff_reports_replacement() {
        let diff = preview_diff("a\nssl_verify: old\nb\n", "a\nssl_verify: new\nb\n");
        assert_eq!(diff, vec!["- ssl_verify: old", "+ ssl_verify: new"]);
    }

    #[test]
    fn preview_diff_empty_when_identical() {
        assert!(preview_diff("same\n", "same\n").is_empty());
    }
}
