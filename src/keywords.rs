//! Keyword classification over normalized page text.
//!
//! Matching is plain substring containment, deliberately not
//! word-boundary aware. The leniency is part of the detection policy;
//! anything stricter belongs behind this interface, not in the evaluator.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces, lowercase, trim.
pub fn normalize(text: &str) -> String {
    RE_WS
        .replace_all(text, " ")
        .to_lowercase()
        .trim()
        .to_string()
}

/// Subsets of the configured keyword lists found in the page text, in
/// configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub any: Vec<String>,
    pub block: Vec<String>,
}

impl KeywordHits {
    pub fn is_empty(&self) -> bool {
        self.any.is_empty() && self.block.is_empty()
    }
}

/// Return which "open" and "block" keywords appear as substrings of the
/// normalized text. Keywords are themselves normalized before the test.
pub fn classify(normalized_text: &str, keywords_any: &[String], keywords_block: &[String]) -> KeywordHits {
    let found = |keywords: &[String]| -> Vec<String> {
        keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.is_empty() && normalized_text.contains(k.as_str()))
            .collect()
    };
    KeywordHits {
        any: found(keywords_any),
        block: found(keywords_block),
    }
}
