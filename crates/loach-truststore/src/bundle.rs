//! Deterministic PEM bundle rendering.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{TrustAnchor, TrustStoreError};

/// Base64 line width inside a PEM block.
const PEM_LINE_WIDTH: usize = 64;

/// Ordered set of anchors destined for one bundle: roots first, then
/// intermediates, each group sorted by thumbprint so repeated runs over
/// an unchanged store render byte-identical output.
#[derive(Debug, Clone)]
pub struct ChainSet {
    roots: Vec<TrustAnchor>,
    intermediates: Vec<TrustAnchor>,
}

impl ChainSet {
    pub fn assemble(mut roots: Vec<TrustAnchor>, mut intermediates: Vec<TrustAnchor>) -> Self {
        roots.sort_by(|a, b| a.thumbprint.cmp(&b.thumbprint));
        intermediates.sort_by(|a, b| a.thumbprint.cmp(&b.thumbprint));
        Self {
            roots,
            intermediates,
        }
    }

    /// Members in bundle order.
    pub fn members(&self) -> impl Iterator<Item = &TrustAnchor> {
        self.roots.iter().chain(self.intermediates.iter())
    }

    pub fn roots(&self) -> &[TrustAnchor] {
        &self.roots
    }

    pub fn intermediates(&self) -> &[TrustAnchor] {
        &self.intermediates
    }

    pub fn len(&self) -> usize {
        self.roots.len() + self.intermediates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.intermediates.is_empty()
    }
}

/// Encode one DER certificate as a PEM block: 64-column base64 body,
/// `\n` line endings, exactly one newline after the END marker.
fn pem_block(der: &[u8]) -> String {
    let b64 = STANDARD.encode(der);
    let mut block = String::with_capacity(b64.len() + 64);
    block.push_str("-----BEGIN CERTIFICATE-----\n");
    for chunk in b64.as_bytes().chunks(PEM_LINE_WIDTH) {
        // chunks of ASCII base64 are valid UTF-8
        block.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        block.push('\n');
    }
    block.push_str("-----END CERTIFICATE-----\n");
    block
}

/// Render the bundle bytes: concatenated PEM blocks in chain order.
pub fn render_bundle(chain: &ChainSet) -> Vec<u8> {
    let mut out = Vec::new();
    for anchor in chain.members() {
        out.extend_from_slice(pem_block(&anchor.der).as_bytes());
    }
    out
}

/// Render and persist the bundle, atomically overwriting `path`.
pub fn write_bundle(chain: &ChainSet, path: &Path) -> Result<(), TrustStoreError> {
    let bytes = render_bundle(chain);
    loach_common::persist::write_atomic(path, &bytes).map_err(|source| {
        TrustStoreError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!(
        path = %path.display(),
        certs = chain.len(),
        "Trust bundle written"
    );
    Ok(())
}
