//! Content extraction: fetches a page, strips boilerplate, and produces a
//! cleaned document or a recoverable rejection.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::CrawlConfig;
use crate::document::{Document, truncate_chars};

const TITLE_MAX_CHARS: usize = 200;
const FALLBACK_TITLE: &str = "Untitled page";

/// Tags whose text never counts as content.
const SKIP_TAGS: [&str; 7] = [
    "script", "style", "nav", "header", "footer", "aside", "noscript",
];

/// Content-bearing containers, tried in priority order.
const CONTENT_SELECTORS: [&str; 7] = [
    "article",
    "main",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "section",
];

/// Outbound client identities, rotated per request.
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
];

/// Why a page did not become a document.
///
/// Every variant is recoverable: callers log and move on to the next URL.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("content too short ({length} chars)")]
    LowQuality { length: usize },

    #[error("page yielded no text")]
    Empty,
}

/// Fetches raw HTML for a URL.
///
/// Injected into the extractor so tests can substitute canned pages for the
/// live client.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError>;
}

/// Production fetcher: bounded timeout, limited redirects, a randomized
/// politeness delay before each request, and a rotated client identity so no
/// single fingerprint accumulates across fetches.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

/// Politeness delay drawn before every fetch, in milliseconds.
const DELAY_RANGE_MS: std::ops::Range<u64> = 1000..3000;

impl HttpPageFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        // Draw randomness before the first await so the future stays Send
        let (delay_ms, agent) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(DELAY_RANGE_MS),
                USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())],
            )
        };

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status));
        }

        Ok(response.text().await?)
    }
}

/// Extracts cleaned documents from web pages.
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    min_content_length: usize,
    max_content_length: usize,
}

impl ContentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            min_content_length: config.min_content_length,
            max_content_length: config.max_content_length,
        }
    }

    /// Fetch and extract a single URL.
    pub async fn extract(&self, url: &str) -> Result<Document, ExtractError> {
        let html = self.fetcher.fetch(url).await?;
        self.extract_from_html(url, &html)
    }

    /// Extract a document from already-fetched HTML.
    pub fn extract_from_html(&self, url: &str, html: &str) -> Result<Document, ExtractError> {
        let parsed = Html::parse_document(html);

        let title = extract_title(&parsed);

        let mut content = String::new();
        for selector in CONTENT_SELECTORS {
            content = select_text(&parsed, selector);
            if !content.is_empty() {
                break;
            }
        }
        if content.is_empty() {
            content = select_text(&parsed, "p");
        }
        if content.is_empty() {
            content = select_text(&parsed, "body");
        }
        if content.is_empty() {
            return Err(ExtractError::Empty);
        }

        let length = content.chars().count();
        if length < self.min_content_length {
            debug!("Low quality content from {url} ({length} chars)");
            return Err(ExtractError::LowQuality { length });
        }

        let domain = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        Ok(Document {
            title,
            content: truncate_chars(&content, self.max_content_length).to_string(),
            url: url.to_string(),
            domain,
        })
    }
}

fn extract_title(document: &Html) -> String {
    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>())
        })
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    truncate_chars(&title, TITLE_MAX_CHARS).to_string()
}

/// Concatenated, whitespace-collapsed text of all elements matching
/// `selector`, skipping non-content tags.
fn select_text(document: &Html, selector: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };

    let mut raw = String::new();
    for element in document.select(&sel) {
        collect_text(element, &mut raw);
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) => {
                if SKIP_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}
