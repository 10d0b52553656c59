//! Privacy sanitization: redacts personally identifying patterns from
//! extracted content before anything is stored.
use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;

/// Replacement token for redacted email addresses.
pub const EMAIL_TOKEN: &str = "[EMAIL]";
/// Replacement token for redacted phone numbers.
pub const PHONE_TOKEN: &str = "[PHONE]";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());

// First-person markers stripped to reduce accidental personal-narrative leakage.
static FIRST_PERSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(my|I am|I was|personally)\b").unwrap());

/// Redact PII patterns from a document's content.
///
/// Pure and total: never fails, and running it twice yields the same output
/// as running it once (the replacement tokens match none of the patterns).
#[must_use]
pub fn sanitize(mut document: Document) -> Document {
    document.content = sanitize_text(&document.content);
    document
}

/// Redact PII patterns from a text fragment.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let redacted = EMAIL_RE.replace_all(text, EMAIL_TOKEN);
    let redacted = PHONE_RE.replace_all(&redacted, PHONE_TOKEN);
    FIRST_PERSON_RE.replace_all(&redacted, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document {
            title: "Title".to_string(),
            content: content.to_string(),
            url: "https://example.com".to_string(),
            domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_redacts_email_and_phone() {
        let sanitized = sanitize(doc("Contact me at a@b.com or 555-123-4567"));
        assert!(!sanitized.content.contains("a@b.com"));
        assert!(!sanitized.content.contains("555-123-4567"));
        assert!(sanitized.content.contains(EMAIL_TOKEN));
        assert!(sanitized.content.contains(PHONE_TOKEN));
    }

    #[test]
    fn test_redacts_phone_variants() {
        let out = sanitize_text("Call 555.123.4567 or 5551234567 today");
        assert!(!out.contains("555.123.4567"));
        assert!(!out.contains("5551234567"));
        assert_eq!(out.matches(PHONE_TOKEN).count(), 2);
    }

    #[test]
    fn test_strips_first_person_markers() {
        let out = sanitize_text("Personally, I was impressed by my results");
        let lower = out.to_lowercase();
        assert!(!lower.contains("personally"));
        assert!(!lower.contains("i was"));
        assert!(!lower.contains("my"));
        assert!(out.contains("impressed"));
    }

    #[test]
    fn test_idempotent() {
        let once = sanitize(doc(
            "Personally, write to john.doe@example.org or 555-123-4567. My thoughts follow.",
        ));
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_text_unchanged() {
        let text = "Cloud computing is the on-demand availability of computing resources.";
        assert_eq!(sanitize_text(text), text);
    }

    #[test]
    fn test_title_and_url_untouched() {
        let mut d = doc("body");
        d.title = "Email a@b.com".to_string();
        let out = sanitize(d.clone());
        assert_eq!(out.title, d.title);
        assert_eq!(out.url, d.url);
    }
}
