//! Trust store abstraction.
//!
//! The ambient OS store is an implicit global data source, so it sits
//! behind a trait with the two scopes the pipeline needs. Tests use
//! [`MemoryStore`] instead of a real credential store.

use crate::{TrustAnchor, TrustStoreError};

/// Read-only access to the two trust store scopes.
pub trait TrustStore {
    /// Certificates in the "trusted roots" scope.
    fn list_root_anchors(&self) -> Result<Vec<TrustAnchor>, TrustStoreError>;

    /// Certificates in the "intermediate authorities" scope.
    fn list_intermediate_anchors(&self) -> Result<Vec<TrustAnchor>, TrustStoreError>;
}

/// The operating system's own trust store.
#[derive(Debug, Default)]
pub struct PlatformStore;

impl PlatformStore {
    pub fn new() -> Self {
        Self
    }
}

impl TrustStore for PlatformStore {
    fn list_root_anchors(&self) -> Result<Vec<TrustAnchor>, TrustStoreError> {
        #[cfg(windows)]
        {
            crate::windows::list_root_anchors()
        }

        #[cfg(target_os = "linux")]
        {
            crate::linux::list_root_anchors()
        }

        #[cfg(target_os = "macos")]
        {
            crate::darwin::list_root_anchors()
        }

        #[cfg(not(any(windows, target_os = "linux", target_os = "macos")))]
        {
            Err(TrustStoreError::Unsupported)
        }
    }

    fn list_intermediate_anchors(&self) -> Result<Vec<TrustAnchor>, TrustStoreError> {
        #[cfg(windows)]
        {
            crate::windows::list_intermediate_anchors()
        }

        #[cfg(target_os = "linux")]
        {
            crate::linux::list_intermediate_anchors()
        }

        #[cfg(target_os = "macos")]
        {
            crate::darwin::list_intermediate_anchors()
        }

        #[cfg(not(any(windows, target_os = "linux", target_os = "macos")))]
        {
            Err(TrustStoreError::Unsupported)
        }
    }
}

/// In-memory trust store fixture.
#[derive(Debug, Default)]
pub struct MemoryStore {
    roots: Vec<TrustAnchor>,
    intermediates: Vec<TrustAnchor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, anchor: TrustAnchor) {
        self.roots.push(anchor);
    }

    pub fn add_intermediate(&mut self, anchor: TrustAnchor) {
        self.intermediates.push(anchor);
    }
}

impl TrustStore for MemoryStore {
    fn list_root_anchors(&self) -> Result<Vec<TrustAnchor>, TrustStoreError> {
        Ok(self.roots.clone())
    }

    fn list_intermediate_anchors(&self) -> Result<Vec<TrustAnchor>, TrustStoreError> {
        Ok(self.intermediates.clone())
    }
}
