/// End-to-end integration tests for the SafeQuery pipeline.
///
/// Tests the complete flow:
///   Config → Crawl (discover → extract → sanitize) → Store → Retrieve → Answer
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex as TokioMutex;

use safequery::answer::retriever::{Retriever, Source};
use safequery::answer::{AnswerPipeline, Query};
use safequery::bootstrap;
use safequery::config::{AnswerConfig, Config, CrawlConfig};
use safequery::crawler::Crawler;
use safequery::crawler::discovery::{SearchProvider, UrlDiscoverer};
use safequery::crawler::extract::{ContentExtractor, ExtractError, PageFetcher};
use safequery::embedder::Embedder;
use safequery::embedder::mock::MockEmbedder;
use safequery::repository::DocumentRepository;
use safequery::store::Db;

// ── Fakes ────────────────────────────────────────────────────────────

struct FixedProvider {
    urls: Vec<String>,
}

#[async_trait]
impl SearchProvider for FixedProvider {
    async fn text_search(&self, _query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut urls = self.urls.clone();
        urls.truncate(max_results);
        Ok(urls)
    }
}

/// Serves canned pages by URL; unknown URLs look like network failures.
struct FixedSite {
    pages: Vec<(String, String)>,
}

#[async_trait]
impl PageFetcher for FixedSite {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        self.pages
            .iter()
            .find(|(page_url, _)| page_url == url)
            .map(|(_, html)| html.clone())
            .ok_or(ExtractError::Empty)
    }
}

fn cloud_page() -> String {
    format!(
        "<html><head><title>Cloud Computing Essentials</title></head><body>\
         <nav>Home | About | Contact us at webmaster@example.com</nav>\
         <article>{} For support call 555-123-4567 or write to help@example.com.</article>\
         <footer>Copyright</footer></body></html>",
        "Cloud computing is the on-demand availability of computer system resources, \
         especially data storage and computing power, without direct active management \
         by the user. Cloud computing relies on sharing of resources to achieve coherence \
         and economies of scale. "
            .repeat(2)
    )
}

fn build_pipeline_parts(
    urls: Vec<&str>,
    pages: Vec<(&str, String)>,
    topics: Vec<&str>,
) -> (Crawler, Arc<DocumentRepository>, Arc<dyn Embedder>) {
    let crawl_config = CrawlConfig::default();
    let embedder: Arc<dyn Embedder> = Arc::new(MockEmbedder::default());
    let repository = Arc::new(DocumentRepository::new(
        Arc::new(TokioMutex::new(Db::open_in_memory().unwrap())),
        embedder.clone(),
    ));

    let discoverer = UrlDiscoverer::new(
        Arc::new(FixedProvider {
            urls: urls.iter().map(ToString::to_string).collect(),
        }),
        crawl_config.blocked_domains.clone(),
    );
    let extractor = ContentExtractor::new(
        Arc::new(FixedSite {
            pages: pages
                .into_iter()
                .map(|(url, html)| (url.to_string(), html))
                .collect(),
        }),
        &crawl_config,
    );
    let crawler = Crawler::new(
        discoverer,
        extractor,
        repository.clone(),
        topics.iter().map(ToString::to_string).collect(),
        1,
    );

    (crawler, repository, embedder)
}

// ── Tests ────────────────────────────────────────────────────────────

/// Full scenario: empty store → one topic with one valid URL → exactly one
/// stored document → retrieval returns it with a score derived from the
/// store's reported distance.
#[tokio::test]
async fn test_crawl_store_retrieve_round_trip() {
    let url = "https://example.com/cloud";
    let (crawler, repository, embedder) = build_pipeline_parts(
        vec![url, "https://www.youtube.com/watch?v=blocked"],
        vec![(url, cloud_page())],
        vec!["cloud computing"],
    );

    assert_eq!(repository.count().await.unwrap(), 0);

    let summary = crawler.run().await;
    assert_eq!(summary.topics_crawled, 1);
    assert_eq!(summary.documents_stored, 1);
    assert_eq!(repository.count().await.unwrap(), 1);

    let retriever = Retriever::new(repository.clone(), embedder.clone());
    let results = retriever.retrieve("cloud computing", 1).await.unwrap();
    assert_eq!(results.len(), 1);

    let result = &results[0];
    assert_eq!(result.url, url);
    assert_eq!(result.title, "Cloud Computing Essentials");
    assert_eq!(result.source, Source::Local);

    // Score must equal 1 − the distance the store reports for this query
    let query_embedding = embedder.embed("cloud computing").await.unwrap();
    let matches = repository.search(&query_embedding, 1).await.unwrap();
    assert!((result.score - (1.0 - matches[0].distance)).abs() < 1e-9);
}

/// Stored content passed through the sanitizer: no raw PII survives.
#[tokio::test]
async fn test_crawled_content_is_sanitized() {
    let url = "https://example.com/cloud";
    let (crawler, repository, embedder) = build_pipeline_parts(
        vec![url],
        vec![(url, cloud_page())],
        vec!["cloud computing"],
    );
    crawler.run().await;

    let query_embedding = embedder.embed("cloud computing").await.unwrap();
    let matches = repository.search(&query_embedding, 1).await.unwrap();
    let stored = &matches[0].content;

    assert!(!stored.contains("help@example.com"));
    assert!(!stored.contains("555-123-4567"));
    assert!(stored.contains("[EMAIL]"));
    assert!(stored.contains("[PHONE]"));
    // Boilerplate containers never reach storage
    assert!(!stored.contains("Copyright"));
}

/// Running the same crawl twice leaves the document count unchanged.
#[tokio::test]
async fn test_repeat_crawl_is_idempotent() {
    let url = "https://example.com/cloud";
    let (crawler, repository, _) = build_pipeline_parts(
        vec![url],
        vec![(url, cloud_page())],
        vec!["cloud computing"],
    );

    let first = crawler.run().await;
    assert_eq!(first.documents_stored, 1);

    let second = crawler.run().await;
    assert_eq!(second.documents_stored, 0);
    assert_eq!(second.documents_skipped, 1);
    assert_eq!(repository.count().await.unwrap(), 1);
}

/// A topic whose URLs all fail still lets later topics proceed.
#[tokio::test]
async fn test_failing_topic_does_not_block_later_topics() {
    let good_url = "https://example.com/cloud";
    let (crawler, repository, _) = build_pipeline_parts(
        vec!["https://example.com/missing", good_url],
        vec![(good_url, cloud_page())],
        vec!["dead topic", "cloud computing"],
    );

    let summary = crawler.run().await;
    assert_eq!(summary.topics_crawled, 2);
    assert_eq!(summary.topics_failed, 0);
    // The first topic skips the dead URL and stores the good one; the second
    // topic sees both URLs as already crawled
    assert_eq!(summary.documents_stored, 1);
    assert_eq!(repository.count().await.unwrap(), 1);
}

/// Query path over a seeded store with no generator configured: extractive
/// synthesis produces the answer.
#[tokio::test]
async fn test_answer_pipeline_extractive_over_seeded_store() {
    let embedder: Arc<dyn Embedder> = Arc::new(MockEmbedder::default());
    let repository = Arc::new(DocumentRepository::new(
        Arc::new(TokioMutex::new(Db::open_in_memory().unwrap())),
        embedder.clone(),
    ));

    let seeded = bootstrap::seed_if_empty(&repository).await.unwrap();
    assert_eq!(seeded, 3);

    let pipeline = AnswerPipeline::new(
        Retriever::new(repository.clone(), embedder),
        repository.clone(),
        None,
        AnswerConfig::default(),
        Duration::from_secs(1),
    );

    let outcome = pipeline
        .answer(&Query {
            text: "What is machine learning?".to_string(),
            max_results: None,
        })
        .await
        .unwrap();

    assert!(!outcome.results.is_empty());
    assert!(!outcome.answer.is_empty());
    assert!(!outcome.stats.generator_used);
    assert_eq!(outcome.stats.knowledge_base_size, 3);

    // Identical input, identical output: the extractive path is deterministic
    let again = pipeline
        .answer(&Query {
            text: "What is machine learning?".to_string(),
            max_results: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome.answer, again.answer);
}

/// Config defaults and validation.
#[test]
fn test_config_defaults_and_validation() {
    let config = Config::default();

    assert_eq!(config.crawl.max_articles_per_topic, 2);
    assert_eq!(config.crawl.min_content_length, 100);
    assert_eq!(config.model.dimensions, 384);
    assert_eq!(config.answer.max_results, 5);
    assert!(config.validate().is_ok());

    let mut bad_config = Config::default();
    bad_config.crawl.topics = vec![];
    assert!(bad_config.validate().is_err());
}

/// MockEmbedder produces consistent results.
#[tokio::test]
async fn test_mock_embedder_consistency() {
    let embedder = MockEmbedder::default();

    let v1 = embedder.embed("hello world").await.unwrap();
    let v2 = embedder.embed("hello world").await.unwrap();

    assert_eq!(v1, v2, "Same input should produce same embedding");
    assert_eq!(v1.len(), embedder.dimensions(), "Should match dimensions");

    let v3 = embedder.embed("different text").await.unwrap();
    assert_ne!(v1, v3, "Different input should produce different embedding");
}
