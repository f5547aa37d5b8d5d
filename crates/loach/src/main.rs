mod cli;
mod orchestrator;

use clap::Parser;

use cli::{Cli, Command};
use loach_truststore::PlatformStore;
use orchestrator::{run_apply, run_rollback, ApplyOptions, ApplySummary, RollbackOptions};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = match cli.verbose {
        0 => cli.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Apply(args) => {
            let opts = ApplyOptions {
                patterns: args.patterns,
                bundle_path: args
                    .bundle_path
                    .unwrap_or_else(loach_common::paths::default_bundle_path),
                config_path: args.config_path,
                key: args.key,
                backup_dir: args
                    .backup_dir
                    .unwrap_or_else(loach_common::paths::loach_backup_dir),
                dry_run: args.dry_run,
            };

            let store = PlatformStore::new();
            let summary = run_apply(&store, &opts)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_apply_summary(&summary);
            }
        }
        Command::Rollback(args) => {
            let opts = RollbackOptions {
                config_path: args.config_path,
                backup_dir: args
                    .backup_dir
                    .unwrap_or_else(loach_common::paths::loach_backup_dir),
                purge_bundle: args.purge_generated.then(|| {
                    args.bundle_path
                        .unwrap_or_else(loach_common::paths::default_bundle_path)
                }),
            };

            let summary = run_rollback(&opts)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Restored {} from {}",
                    summary.config_path.display(),
                    summary.restored_from.display()
                );
                if let Some(bundle) = &summary.purged_bundle {
                    println!("Deleted generated bundle {}", bundle.display());
                }
            }
        }
    }

    Ok(())
}

fn print_apply_summary(summary: &ApplySummary) {
    let verb = if summary.dry_run { "Would write" } else { "Wrote" };

    println!(
        "Matched {} root(s), {} intermediate(s)",
        summary.roots.len(),
        summary.intermediates.len()
    );
    for subject in summary.roots.iter().chain(&summary.intermediates) {
        println!("  {subject}");
    }
    println!(
        "{verb} {} ({} bytes)",
        summary.bundle_path.display(),
        summary.bundle_bytes
    );

    match (&summary.config_path, &summary.config_diff) {
        (Some(path), Some(diff)) if diff.is_empty() => {
            println!("{} already up to date", path.display());
        }
        (Some(path), Some(diff)) => {
            println!("Would change {}:", path.display());
            for line in diff {
                println!("  {line}");
            }
        }
        (Some(path), None) => {
            println!("Patched {}", path.display());
            if let Some(backup) = &summary.backup_path {
                println!("Backup: {}", backup.display());
            }
        }
        (None, _) => {}
    }
}
