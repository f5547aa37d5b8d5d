//! Windows trust store enumeration via PowerShell.
//!
//! Reads the per-user `Root` (trusted roots) and `CA` (intermediate
//! authorities) stores. Each certificate is exported as one base64 DER
//! per output line and parsed on our side, so subject/issuer/thumbprint
//! derivation is identical across platforms.

use std::process::Command;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::anchor::anchors_from_der;
use crate::{TrustAnchor, TrustStoreError};

pub fn list_root_anchors() -> Result<Vec<TrustAnchor>, TrustStoreError> {
    list_store("Root")
}

pub fn list_intermediate_anchors() -> Result<Vec<TrustAnchor>, TrustStoreError> {
    list_store("CA")
}

fn list_store(store_name: &str) -> Result<Vec<TrustAnchor>, TrustStoreError> {
    let script = format!(
        "Get-ChildItem -Path Cert:\\CurrentUser\\{store_name} | \
         ForEach-Object {{ [Convert]::ToBase64String($_.RawData) }}"
    );

    let output = Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", &script])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TrustStoreError::CommandFailed(format!(
            "powershell Cert:\\CurrentUser\\{store_name} exit code {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut blobs = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match STANDARD.decode(line) {
            Ok(der) => blobs.push(der),
            Err(e) => {
                tracing::warn!(store = store_name, error = %e, "Skipping undecodable store line")
            }
        }
    }

    let anchors = anchors_from_der(blobs);
    tracing::debug!(store = store_name, count = anchors.len(), "Enumerated store scope");
    Ok(anchors)
}
