//! Sample-document seeding.
//!
//! Guarantees the knowledge base can answer something sensible before the
//! first crawl completes.
use anyhow::Result;
use tracing::info;

use crate::document::Document;
use crate::repository::DocumentRepository;

/// Built-in fallback corpus used when the store starts out empty.
#[must_use]
pub fn sample_documents() -> Vec<Document> {
    let samples = [
        (
            "Artificial Intelligence Fundamentals",
            "Artificial Intelligence (AI) is the simulation of human intelligence processes by machines, \
             especially computer systems. These processes include learning (the acquisition of information \
             and rules for using the information), reasoning (using rules to reach approximate or definite \
             conclusions), and self-correction. AI applications include expert systems, natural language \
             processing, speech recognition, and machine vision. Modern AI techniques include machine \
             learning, deep learning, neural networks, and natural language processing.",
            "https://example.com/ai-fundamentals",
        ),
        (
            "Machine Learning Overview",
            "Machine Learning is a subset of artificial intelligence that focuses on the development of \
             algorithms and statistical models that enable computer systems to improve their performance on \
             a specific task through experience. Machine learning algorithms build mathematical models based \
             on training data to make predictions or decisions without being explicitly programmed to perform \
             the task. Types include supervised learning, unsupervised learning, and reinforcement learning.",
            "https://example.com/ml-overview",
        ),
        (
            "Cloud Computing Essentials",
            "Cloud computing is the on-demand availability of computer system resources, especially data \
             storage and computing power, without direct active management by the user. The term is generally \
             used to describe data centers available to many users over the Internet. Cloud computing relies \
             on sharing of resources to achieve coherence and economies of scale. Types include Infrastructure \
             as a Service (IaaS), Platform as a Service (PaaS), and Software as a Service (SaaS).",
            "https://example.com/cloud-computing",
        ),
    ];

    samples
        .into_iter()
        .map(|(title, content, url)| Document {
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
            domain: "example.com".to_string(),
        })
        .collect()
}

/// Seed the sample corpus when the store is empty. Returns how many
/// documents were added (zero when the store already has content).
pub async fn seed_if_empty(repository: &DocumentRepository) -> Result<usize> {
    if repository.count().await? > 0 {
        return Ok(0);
    }

    info!("Knowledge base is empty, seeding sample documents");
    let outcome = repository.store(&sample_documents()).await?;
    info!("Seeded {} sample documents", outcome.stored);
    Ok(outcome.stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::mock::MockEmbedder;
    use crate::store::Db;
    use std::sync::Arc;
    use tokio::sync::Mutex as TokioMutex;

    fn repository() -> DocumentRepository {
        DocumentRepository::new(
            Arc::new(TokioMutex::new(Db::open_in_memory().unwrap())),
            Arc::new(MockEmbedder::default()),
        )
    }

    #[tokio::test]
    async fn test_seeds_empty_store_once() {
        let repo = repository();

        let seeded = seed_if_empty(&repo).await.unwrap();
        assert_eq!(seeded, 3);
        assert_eq!(repo.count().await.unwrap(), 3);

        // Already populated: a second call is a no-op
        let seeded = seed_if_empty(&repo).await.unwrap();
        assert_eq!(seeded, 0);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[test]
    fn test_sample_documents_meet_quality_bounds() {
        for doc in sample_documents() {
            assert!(doc.content.len() >= 100);
            assert!(!doc.url.is_empty());
            assert_eq!(doc.domain, "example.com");
        }
    }
}
