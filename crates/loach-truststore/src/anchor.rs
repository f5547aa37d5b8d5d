//! Trust anchor type and certificate parsing.

use sha2::{Digest, Sha256};
use x509_parser::prelude::*;

use crate::TrustStoreError;

/// A certificate read from a trust store. Immutable once read; identity
/// is the thumbprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    /// Subject distinguished name (human-readable).
    pub subject: String,
    /// Issuer distinguished name (human-readable).
    pub issuer: String,
    /// Subject Common Name, if the certificate carries one.
    pub common_name: Option<String>,
    /// SHA-256 of the DER encoding, lowercase hex. Unique id.
    pub thumbprint: String,
    /// Raw DER certificate bytes.
    pub der: Vec<u8>,
}

impl TrustAnchor {
    /// Parse a DER-encoded certificate into an anchor.
    pub fn from_der(der: Vec<u8>) -> Result<Self, TrustStoreError> {
        let (subject, issuer, common_name) = {
            let (_, cert) = X509Certificate::from_der(&der)
                .map_err(|e| TrustStoreError::BadCertificate(e.to_string()))?;
            let common_name = cert
                .subject()
                .iter_common_name()
                .next()
                .and_then(|cn| cn.as_str().ok())
                .map(str::to_string);
            (cert.subject().to_string(), cert.issuer().to_string(), common_name)
        };

        let thumbprint = hex::encode(Sha256::digest(&der));
        Ok(Self {
            subject,
            issuer,
            common_name,
            thumbprint,
            der,
        })
    }

    /// Token used for issuer→subject naming linkage: the Common Name if
    /// present, else the full subject string.
    pub fn linkage_token(&self) -> &str {
        self.common_name.as_deref().unwrap_or(&self.subject)
    }
}

/// Parse a sequence of DER blobs, skipping (with a warning) entries that
/// are not valid certificates. Store scopes sometimes contain junk; one
/// bad entry must not abort enumeration.
pub(crate) fn anchors_from_der(blobs: Vec<Vec<u8>>) -> Vec<TrustAnchor> {
    let mut anchors = Vec::with_capacity(blobs.len());
    for der in blobs {
        match TrustAnchor::from_der(der) {
            Ok(anchor) => anchors.push(anchor),
            Err(e) => tracing::warn!(error = %e, "Skipping unparseable store entry"),
        }
    }
    anchors
}

/// Extract DER blobs from PEM text, keeping only CERTIFICATE blocks.
#[cfg(any(target_os = "linux", target_os = "macos", test))]
pub(crate) fn ders_from_pem(data: &[u8]) -> Vec<Vec<u8>> {
    let mut ders = Vec::new();
    for pem in x509_parser::pem::Pem::iter_from_buffer(data).flatten() {
        if pem.label == "CERTIFICATE" {
            ders.push(pem.contents);
        }
    }
    ders
}
