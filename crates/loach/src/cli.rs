use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Directive key owned by loach unless overridden.
pub const DEFAULT_DIRECTIVE_KEY: &str = "ssl_verify";

#[derive(Parser, Debug)]
#[command(
    name = "loach",
    version,
    about = "Build a trust bundle from the OS trust store and wire it into tool config"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOACH_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Match roots, resolve intermediates, write the bundle, patch the config
    Apply(ApplyArgs),
    /// Restore the config from its newest backup
    Rollback(RollbackArgs),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Subject glob patterns, comma-separated (e.g. "*Zscaler Root CA*")
    #[arg(long, value_delimiter = ',', required = true, value_name = "GLOB,...")]
    pub patterns: Vec<String>,

    /// Where to write the PEM bundle (default: the loach data directory)
    #[arg(long, value_name = "PATH")]
    pub bundle_path: Option<PathBuf>,

    /// Config file to patch with the directive; omit to only write the bundle
    #[arg(long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Directive key owned by loach in the config file
    #[arg(long, default_value = DEFAULT_DIRECTIVE_KEY)]
    pub key: String,

    /// Preview the pipeline without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Backup directory (default: the loach data directory)
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Config file to restore from its newest backup
    #[arg(long, value_name = "PATH")]
    pub config_path: PathBuf,

    /// Also delete the generated bundle file
    #[arg(long)]
    pub purge_generated: bool,

    /// Bundle file to purge (default: the loach data directory)
    #[arg(long, value_name = "PATH")]
    pub bundle_path: Option<PathBuf>,

    /// Backup directory (default: the loach data directory)
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,
}
