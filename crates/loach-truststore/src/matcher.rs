//! Glob-style subject matching.
//!
//! Patterns use `*` as "any run of characters" and match
//! case-insensitively. Multiple patterns are ORed.

use regex::Regex;

use crate::TrustStoreError;

/// A compiled set of subject match patterns.
#[derive(Debug)]
pub struct PatternSet {
    patterns: Vec<String>,
    regexes: Vec<Regex>,
}

impl PatternSet {
    /// Compile glob patterns into anchored case-insensitive matchers.
    pub fn compile(patterns: &[String]) -> Result<Self, TrustStoreError> {
        let mut regexes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
                TrustStoreError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                }
            })?;
            regexes.push(regex);
        }
        Ok(Self {
            patterns: patterns.to_vec(),
            regexes,
        })
    }

    /// True if `subject` matches any pattern in the set.
    pub fn matches(&self, subject: &str) -> bool {
        self.regexes.iter().any(|r| r.is_match(subject))
    }

    /// The original pattern strings, for error reporting.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Translate a glob pattern into an anchored case-insensitive regex.
/// Everything except `*` is matched literally.
fn glob_to_regex(pattern: &str) -> String {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    format!("(?i)^{}$", escaped.join(".*"))
}
