//! Extractive answer synthesis.
//!
//! Ranks sentences across retrieved documents by keyword overlap and
//! assembles the best ones into an answer. Used whenever no generative model
//! is configured, and as the fallback when generation fails. Deterministic
//! and side-effect-free: identical inputs always produce identical output.
use std::collections::HashSet;

use super::retriever::SearchResult;
use crate::document::truncate_chars;

/// Returned when there are no documents to draw from.
pub const INSUFFICIENT_INFO_MESSAGE: &str =
    "I couldn't find enough relevant information in the knowledge base to answer your question.";

/// Sentences shorter than this are never considered.
const MIN_SENTENCE_CHARS: usize = 10;
/// Sentences longer than this earn the length bonus.
const LONG_SENTENCE_CHARS: usize = 50;
/// Minimum first-sentence length for the per-document fallback.
const FALLBACK_SENTENCE_CHARS: usize = 30;
/// Content preview length for the last-resort fallback.
const FALLBACK_CONTENT_CHARS: usize = 200;
/// At most this many sentences make up an answer.
const MAX_ANSWER_SENTENCES: usize = 3;

const STOP_WORDS: [&str; 44] = [
    "a", "about", "an", "and", "are", "as", "at", "be", "been", "being", "but", "by", "can",
    "could", "do", "does", "for", "how", "in", "is", "it", "its", "may", "might", "not", "of",
    "on", "or", "should", "that", "the", "these", "this", "those", "to", "was", "were", "what",
    "when", "where", "which", "who", "why", "will",
];

/// Sentence scoring knobs. The defaults are empirically chosen; they are
/// exposed as parameters rather than re-derived.
#[derive(Debug, Clone, Copy)]
pub struct Scoring {
    /// Minimum relevance score a sentence must exceed to be kept.
    pub relevance_threshold: f64,
    /// Added when any query keyword appears in the document title.
    pub title_bonus: f64,
    /// Added to sentences long enough to carry context.
    pub length_bonus: f64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.2,
            title_bonus: 0.3,
            length_bonus: 0.1,
        }
    }
}

/// Assemble an answer for `query` from the top `limit` ranked documents.
#[must_use]
pub fn synthesize(
    query: &str,
    documents: &[SearchResult],
    limit: usize,
    scoring: &Scoring,
) -> String {
    if documents.is_empty() {
        return INSUFFICIENT_INFO_MESSAGE.to_string();
    }

    let keywords = query_keywords(query);

    // Score every qualifying sentence in the top documents
    let mut candidates: Vec<(String, f64)> = Vec::new();
    for document in documents.iter().take(limit) {
        let title_matches = !word_set(&document.title).is_disjoint(&keywords);

        for sentence in sentences(&document.content) {
            let overlap = word_set(sentence).intersection(&keywords).count();
            let mut score = overlap as f64 / keywords.len().max(1) as f64;
            if title_matches {
                score += scoring.title_bonus;
            }
            if sentence.chars().count() > LONG_SENTENCE_CHARS {
                score += scoring.length_bonus;
            }

            if score > scoring.relevance_threshold {
                candidates.push((sentence.to_string(), score));
            }
        }
    }

    // Stable sort: ties keep encounter order, so earlier documents win
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for (sentence, _) in &candidates {
        if selected.len() >= MAX_ANSWER_SENTENCES {
            break;
        }
        if seen.insert(sentence.as_str()) {
            selected.push(sentence);
        }
    }

    if !selected.is_empty() {
        let mut answer = selected.join(". ");
        if !answer.ends_with(['.', '!', '?']) {
            answer.push('.');
        }
        return answer;
    }

    fallback_answer(&documents[0])
}

/// No sentence cleared the threshold: lead with the top document instead.
fn fallback_answer(top: &SearchResult) -> String {
    if let Some(sentence) = sentences(&top.content)
        .find(|s| s.chars().count() > FALLBACK_SENTENCE_CHARS)
    {
        return format!(
            "Based on the information about {}: {}.",
            top.title, sentence
        );
    }

    format!(
        "According to the search results: {}...",
        truncate_chars(top.content.trim(), FALLBACK_CONTENT_CHARS)
    )
}

fn query_keywords(query: &str) -> HashSet<String> {
    let mut keywords = word_set(query);
    for stop in STOP_WORDS {
        keywords.remove(stop);
    }
    keywords
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn sentences(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
}
