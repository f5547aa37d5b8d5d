//! Intermediate resolution by issuer naming linkage.
//!
//! This is a heuristic, not cryptographic chain validation: an
//! intermediate is linked to a root when its issuer string contains the
//! root's linkage token (subject CN, else the full subject) as a
//! case-insensitive substring. Signatures are never verified.

use std::collections::HashSet;

use crate::{TrustAnchor, TrustStore, TrustStoreError};

/// Collect intermediates from the secondary store scope whose issuer
/// links back to one of the matched `roots`.
///
/// Finding none is not an error — single-tier enterprise CAs are
/// root-only — but it is logged as a warning.
pub fn resolve_intermediates(
    store: &dyn TrustStore,
    roots: &[TrustAnchor],
) -> Result<Vec<TrustAnchor>, TrustStoreError> {
    let tokens: Vec<String> = roots
        .iter()
        .map(|r| r.linkage_token().to_lowercase())
        .collect();
    let root_prints: HashSet<&str> = roots.iter().map(|r| r.thumbprint.as_str()).collect();

    let mut seen = HashSet::new();
    let mut linked = Vec::new();
    for candidate in store.list_intermediate_anchors()? {
        let issuer = candidate.issuer.to_lowercase();
        let is_linked = tokens.iter().any(|t| issuer.contains(t.as_str()));
        if is_linked
            && !root_prints.contains(candidate.thumbprint.as_str())
            && seen.insert(candidate.thumbprint.clone())
        {
            linked.push(candidate);
        }
    }

    if linked.is_empty() {
        tracing::warn!(
            roots = roots.len(),
            "No intermediate certificates link to the matched roots; continuing with roots only"
        );
    } else {
        tracing::debug!(count = linked.len(), "Linked intermediate certificates");
    }

    Ok(linked)
}
