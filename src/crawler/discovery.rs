//! URL discovery: queries a search provider for candidate URLs and filters
//! them against a configured domain blocklist.
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

/// A text search provider returning candidate URLs in relevance order.
///
/// Any provider error surfaces as an `Err`; the discoverer downgrades it to
/// an empty candidate list.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn text_search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
}

/// DuckDuckGo JSON API provider. Privacy-focused, no auth required.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn text_search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = format!(
            "https://api.duckduckgo.com/?q={}&format=json&no_redirect=1&no_html=1",
            urlencoding::encode(query)
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("search provider returned {}", response.status());
        }

        let payload: Value = response.json().await?;
        let mut urls = Vec::new();

        if let Some(abstract_url) = payload.get("AbstractURL").and_then(|v| v.as_str()) {
            if !abstract_url.is_empty() {
                urls.push(abstract_url.to_string());
            }
        }

        if let Some(items) = payload.get("Results").and_then(|v| v.as_array()) {
            collect_result_urls(items, &mut urls);
        }
        if let Some(items) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
            collect_result_urls(items, &mut urls);
        }

        urls.truncate(max_results);
        Ok(urls)
    }
}

fn collect_result_urls(items: &[Value], urls: &mut Vec<String>) {
    for item in items {
        // Related topics can be nested one level under a category
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            collect_result_urls(topics, urls);
            continue;
        }
        if let Some(first_url) = item.get("FirstURL").and_then(|v| v.as_str()) {
            if !first_url.is_empty() {
                urls.push(first_url.to_string());
            }
        }
    }
}

/// Discovers crawlable URLs for a topic, filtering provider results for
/// syntactic validity, blocklisted hosts, and within-batch duplicates.
pub struct UrlDiscoverer {
    provider: Arc<dyn SearchProvider>,
    blocked_domains: Vec<String>,
}

impl UrlDiscoverer {
    pub fn new(provider: Arc<dyn SearchProvider>, blocked_domains: Vec<String>) -> Self {
        Self {
            provider,
            blocked_domains,
        }
    }

    /// Return at most `want` candidate URLs for `topic`, in provider
    /// relevance order. Provider failures degrade to an empty list.
    pub async fn discover(&self, topic: &str, want: usize) -> Vec<String> {
        // Over-fetch to absorb filtering loss
        let raw = match self.provider.text_search(topic, want * 2).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("URL discovery failed for topic: {e}");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for candidate in raw {
            if urls.len() >= want {
                break;
            }
            if !self.is_crawlable(&candidate) {
                continue;
            }
            if seen.insert(candidate.clone()) {
                urls.push(candidate);
            }
        }

        info!("Discovered {} URLs for topic query", urls.len());
        urls
    }

    /// Validate a URL and check it against the domain blocklist.
    fn is_crawlable(&self, raw: &str) -> bool {
        let Ok(parsed) = Url::parse(raw) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = parsed.host_str() else {
            return false;
        };

        let host = host.to_lowercase();
        !self
            .blocked_domains
            .iter()
            .any(|blocked| host.contains(blocked.as_str()))
    }
}
