//! Similarity retrieval: embeds a query, asks the store for nearest
//! neighbors, and converts distances to similarity scores.
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::embedder::Embedder;
use crate::repository::DocumentRepository;

/// Where a search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Local,
}

/// A scored retrieval hit.
///
/// `score = 1 − distance` under the store's normalized cosine metric; values
/// land in `[0, 1]` for reasonable inputs but are not clamped, so degenerate
/// embeddings can fall slightly outside that range.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub url: String,
    pub domain: String,
    pub score: f64,
    pub source: Source,
}

pub struct Retriever {
    repository: Arc<DocumentRepository>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(repository: Arc<DocumentRepository>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            repository,
            embedder,
        }
    }

    /// Retrieve up to `k` results ordered by descending score.
    ///
    /// An empty knowledge base short-circuits to an empty list without
    /// touching the embedder — a valid steady state, not an error.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if self.repository.count().await? == 0 {
            debug!("Knowledge base is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query).await?;
        let matches = self.repository.search(&embedding, k).await?;

        Ok(matches
            .into_iter()
            .map(|m| SearchResult {
                title: m.title,
                content: m.content,
                url: m.url,
                domain: m.domain,
                score: 1.0 - m.distance,
                source: Source::Local,
            })
            .collect())
    }
}
