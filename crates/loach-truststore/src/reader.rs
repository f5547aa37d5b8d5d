//! Root anchor discovery: pattern matching over the trusted-roots scope.

use std::collections::HashSet;

use crate::{PatternSet, TrustAnchor, TrustStore, TrustStoreError};

/// Find root anchors whose subject matches any of the glob `patterns`.
///
/// Results are deduplicated by thumbprint, order-stable by discovery.
/// An empty result is a hard error: every downstream step depends on at
/// least one matched anchor.
pub fn find_anchors(
    store: &dyn TrustStore,
    patterns: &[String],
) -> Result<Vec<TrustAnchor>, TrustStoreError> {
    let set = PatternSet::compile(patterns)?;

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for anchor in store.list_root_anchors()? {
        if set.matches(&anchor.subject) && seen.insert(anchor.thumbprint.clone()) {
            matched.push(anchor);
        }
    }

    if matched.is_empty() {
        return Err(TrustStoreError::NoMatch {
            patterns: set.patterns().to_vec(),
        });
    }

    tracing::debug!(count = matched.len(), "Matched root trust anchors");
    Ok(matched)
}
