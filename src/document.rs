//! The crawled-document record and its stable identity key.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored, deduplicated unit of crawled content.
///
/// Immutable once stored. The identity key is derived from the source URL so
/// the same page never produces two entries; content-only documents (no URL)
/// fall back to a content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    pub url: String,
    pub domain: String,
}

impl Document {
    /// Stable, deterministic identity key: sha256 of the URL when present,
    /// of the content otherwise.
    #[must_use]
    pub fn identity_key(&self) -> String {
        let source = if self.url.is_empty() {
            self.content.as_bytes()
        } else {
            self.url.as_bytes()
        };
        hex::encode(Sha256::digest(source))
    }
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
