//! Topic crawling: discovery → extraction → sanitization → storage, with
//! per-topic failure isolation.
pub mod discovery;
pub mod extract;
pub mod sanitize;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::repository::{DocumentRepository, StoreOutcome};
use crate::crawler::discovery::UrlDiscoverer;
use crate::crawler::extract::ContentExtractor;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub topics_crawled: usize,
    pub topics_failed: usize,
    pub documents_stored: usize,
    pub documents_skipped: usize,
}

/// Drives the crawl pipeline over the configured topic list.
///
/// Holds no scheduling logic; callers invoke [`Crawler::run`] at startup and
/// on whatever cadence they choose.
pub struct Crawler {
    discoverer: UrlDiscoverer,
    extractor: ContentExtractor,
    repository: Arc<DocumentRepository>,
    topics: Vec<String>,
    max_articles: usize,
}

impl Crawler {
    pub fn new(
        discoverer: UrlDiscoverer,
        extractor: ContentExtractor,
        repository: Arc<DocumentRepository>,
        topics: Vec<String>,
        max_articles: usize,
    ) -> Self {
        Self {
            discoverer,
            extractor,
            repository,
            topics,
            max_articles,
        }
    }

    /// Crawl every configured topic once.
    ///
    /// A failure anywhere in one topic's sub-pipeline is logged and does not
    /// prevent subsequent topics from running; this never returns an error.
    pub async fn run(&self) -> CrawlSummary {
        info!("Starting crawl over {} topics", self.topics.len());

        let mut summary = CrawlSummary::default();
        let mut crawled_urls = HashSet::new();

        for topic in &self.topics {
            match self.crawl_topic(topic, &mut crawled_urls).await {
                Ok(outcome) => {
                    summary.topics_crawled += 1;
                    summary.documents_stored += outcome.stored;
                    summary.documents_skipped += outcome.skipped;
                }
                Err(e) => {
                    warn!("Topic crawl failed: {e:#}");
                    summary.topics_failed += 1;
                }
            }
        }

        info!(
            "Crawl finished: {} stored, {} skipped, {}/{} topics ok",
            summary.documents_stored,
            summary.documents_skipped,
            summary.topics_crawled,
            self.topics.len()
        );
        summary
    }

    async fn crawl_topic(
        &self,
        topic: &str,
        crawled_urls: &mut HashSet<String>,
    ) -> Result<StoreOutcome> {
        let urls = self
            .discoverer
            .discover(topic, self.max_articles * 2)
            .await;

        let mut batch = Vec::new();
        for url in urls {
            if batch.len() >= self.max_articles {
                break;
            }
            // Session-scoped dedup: different topics can surface the same URL
            if !crawled_urls.insert(url.clone()) {
                debug!("Skipping already crawled URL: {url}");
                continue;
            }

            match self.extractor.extract(&url).await {
                Ok(document) => batch.push(sanitize::sanitize(document)),
                Err(e) => debug!("Skipping {url}: {e}"),
            }
        }

        if batch.is_empty() {
            info!("No usable articles for topic");
            return Ok(StoreOutcome::default());
        }

        self.repository.store(&batch).await
    }
}
