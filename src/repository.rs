//! Deduplicating, idempotent ingestion over the vector store.
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex as TokioMutex;
use tracing::info;

use crate::document::Document;
use crate::embedder::Embedder;
use crate::store::Db;
use crate::store::models::DocumentMatch;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    pub stored: usize,
    pub skipped: usize,
}

/// Write/read interface over the vector store.
///
/// Computes a stable identity key per document and skips keys that already
/// exist, so storing the same input twice changes the document count at most
/// once per distinct key — including under concurrent writers, where the
/// store-level conflict handling is the authority.
pub struct DocumentRepository {
    db: Arc<TokioMutex<Db>>,
    embedder: Arc<dyn Embedder>,
}

impl DocumentRepository {
    pub fn new(db: Arc<TokioMutex<Db>>, embedder: Arc<dyn Embedder>) -> Self {
        Self { db, embedder }
    }

    /// Store a batch of documents, embedding only the ones not already
    /// present. The embedding call is batched across all new documents.
    pub async fn store(&self, documents: &[Document]) -> Result<StoreOutcome> {
        if documents.is_empty() {
            return Ok(StoreOutcome::default());
        }

        let mut outcome = StoreOutcome::default();
        let mut batch_keys = HashSet::new();
        let mut pending: Vec<(String, &Document)> = Vec::new();

        {
            let db = self.db.lock().await;
            for document in documents {
                let key = document.identity_key();
                if !batch_keys.insert(key.clone()) || db.contains_document(&key)? {
                    outcome.skipped += 1;
                    continue;
                }
                pending.push((key, document));
            }
        }

        if pending.is_empty() {
            info!("All {} documents already stored", documents.len());
            return Ok(outcome);
        }

        let contents: Vec<&str> = pending.iter().map(|(_, d)| d.content.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&contents)
            .await
            .context("failed to embed document batch")?;

        let mut db = self.db.lock().await;
        for ((key, document), embedding) in pending.iter().zip(&embeddings) {
            if db.insert_document(key, document, embedding)? {
                outcome.stored += 1;
            } else {
                // A concurrent writer got there first
                outcome.skipped += 1;
            }
        }

        info!(
            "Stored {} new documents ({} skipped)",
            outcome.stored, outcome.skipped
        );
        Ok(outcome)
    }

    /// Total stored documents.
    pub async fn count(&self) -> Result<usize> {
        let db = self.db.lock().await;
        Ok(db.count_documents()?)
    }

    /// Nearest-neighbor search over stored documents. An empty store yields
    /// an empty list.
    pub async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<DocumentMatch>> {
        let db = self.db.lock().await;
        Ok(db.nearest(embedding, k)?)
    }

    /// Most recently stored titles, newest first.
    pub async fn recent_titles(&self, limit: usize) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        Ok(db.recent_titles(limit)?)
    }
}
