//! Linux trust store enumeration.
//!
//! Linux has no root/intermediate scope split, so the mapping is a
//! heuristic: "trusted roots" is the system ca-certificates bundle and
//! "intermediate authorities" is the locally-added certificate directory
//! consumed by `update-ca-certificates`.

use std::path::Path;

use crate::anchor::{anchors_from_der, ders_from_pem};
use crate::{TrustAnchor, TrustStoreError};

const SYSTEM_BUNDLE: &str = "/etc/ssl/certs/ca-certificates.crt";
const LOCAL_CA_DIR: &str = "/usr/local/share/ca-certificates";

pub fn list_root_anchors() -> Result<Vec<TrustAnchor>, TrustStoreError> {
    let path = Path::new(SYSTEM_BUNDLE);
    let data = std::fs::read(path).map_err(|source| TrustStoreError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(anchors_from_der(ders_from_pem(&data)))
}

pub fn list_intermediate_anchors() -> Result<Vec<TrustAnchor>, TrustStoreError> {
    let dir = Path::new(LOCAL_CA_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut blobs = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| TrustStoreError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_cert = path
            .extension()
            .map(|ext| ext == "crt" || ext == "pem")
            .unwrap_or(false);
        if !is_cert {
            continue;
        }
        match std::fs::read(&path) {
            Ok(data) => blobs.extend(ders_from_pem(&data)),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable certificate file"),
        }
    }

    Ok(anchors_from_der(blobs))
}
