//! macOS trust store enumeration via the `security` CLI.
//!
//! "Trusted roots" maps to the SystemRootCertificates keychain,
//! "intermediate authorities" to the System keychain, where admin-added
//! issuing CAs usually land.

use std::process::Command;

use crate::anchor::{anchors_from_der, ders_from_pem};
use crate::{TrustAnchor, TrustStoreError};

const ROOTS_KEYCHAIN: &str = "/System/Library/Keychains/SystemRootCertificates.keychain";
const SYSTEM_KEYCHAIN: &str = "/Library/Keychains/System.keychain";

pub fn list_root_anchors() -> Result<Vec<TrustAnchor>, TrustStoreError> {
    list_keychain(ROOTS_KEYCHAIN)
}

pub fn list_intermediate_anchors() -> Result<Vec<TrustAnchor>, TrustStoreError> {
    list_keychain(SYSTEM_KEYCHAIN)
}

fn list_keychain(keychain: &str) -> Result<Vec<TrustAnchor>, TrustStoreError> {
    let output = Command::new("security")
        .args(["find-certificate", "-a", "-p", keychain])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TrustStoreError::CommandFailed(format!(
            "security find-certificate ({keychain}) exit code {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    let anchors = anchors_from_der(ders_from_pem(&output.stdout));
    tracing::debug!(keychain, count = anchors.len(), "Enumerated keychain");
    Ok(anchors)
}
