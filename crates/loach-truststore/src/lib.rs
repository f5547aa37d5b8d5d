//! OS trust store enumeration and trust bundle construction for loach.
//!
//! Reads certificates from the ambient per-user trust store, selects the
//! ones whose subject matches caller-supplied glob patterns, links
//! intermediates to the matched roots by issuer naming, and renders the
//! result as a single deterministic PEM bundle.
//!
//! The store itself is abstracted behind the [`TrustStore`] trait so tests
//! substitute an in-memory fixture instead of touching a real credential
//! store. Platform backends:
//! - **Windows**: PowerShell `Get-ChildItem Cert:\CurrentUser\{Root,CA}`
//! - **Linux**: system ca-certificates bundle + `/usr/local/share/ca-certificates`
//! - **macOS**: `security find-certificate -a -p` against the system keychains

use std::path::PathBuf;

mod anchor;
mod bundle;
mod chain;
mod matcher;
mod reader;
mod store;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(windows)]
mod windows;

pub use anchor::TrustAnchor;
pub use bundle::{render_bundle, write_bundle, ChainSet};
pub use chain::resolve_intermediates;
pub use matcher::PatternSet;
pub use reader::find_anchors;
pub use store::{MemoryStore, PlatformStore, TrustStore};

#[derive(Debug, thiserror::Error)]
pub enum TrustStoreError {
    #[error("no trust anchors matched patterns: {}", patterns.join(", "))]
    NoMatch { patterns: Vec<String> },

    #[error("invalid match pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("not a parseable certificate: {0}")]
    BadCertificate(String),

    #[error("trust store command failed: {0}")]
    CommandFailed(String),

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

    #[error("platform not supported")]
    Unsupported,
}
