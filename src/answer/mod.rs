//! The answer pipeline: retrieval composed with the generation fallback
//! chain (generator → extractive synthesizer → fixed message).
pub mod extractive;
pub mod generator;
pub mod retriever;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::AnswerConfig;
use crate::repository::DocumentRepository;
use crate::answer::extractive::Scoring;
use crate::answer::generator::Generator;
use crate::answer::retriever::{Retriever, SearchResult};

/// Minimum query length after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// Label reported in stats for the backing store.
pub const STORAGE_LABEL: &str = "local_vector_store";

/// A natural-language query, validated at the pipeline boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct Query {
    pub text: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("query must be at least {MIN_QUERY_CHARS} characters long")]
    QueryTooShort,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Operational counters returned alongside each answer. Informational only;
/// nothing branches on them.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerStats {
    pub results_found: usize,
    pub knowledge_base_size: usize,
    pub answer_length: usize,
    pub generator_used: bool,
    pub storage: &'static str,
}

#[derive(Debug)]
pub struct AnswerOutcome {
    pub results: Vec<SearchResult>,
    pub answer: String,
    pub stats: AnswerStats,
}

pub struct AnswerPipeline {
    retriever: Retriever,
    repository: Arc<DocumentRepository>,
    generator: Option<Arc<dyn Generator>>,
    config: AnswerConfig,
    generation_timeout: Duration,
}

impl AnswerPipeline {
    pub fn new(
        retriever: Retriever,
        repository: Arc<DocumentRepository>,
        generator: Option<Arc<dyn Generator>>,
        config: AnswerConfig,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            retriever,
            repository,
            generator,
            config,
            generation_timeout,
        }
    }

    /// Answer a query: retrieve, then synthesize.
    ///
    /// An empty knowledge base and an unavailable generator are expected
    /// steady-state conditions — both yield a best-effort answer string, never
    /// an error. Only invalid input and store failures error out.
    pub async fn answer(&self, query: &Query) -> Result<AnswerOutcome, AnswerError> {
        let text = query.text.trim();
        if text.chars().count() < MIN_QUERY_CHARS {
            return Err(AnswerError::QueryTooShort);
        }

        let k = query.max_results.unwrap_or(self.config.max_results);
        let results = self.retriever.retrieve(text, k).await?;
        let (answer, generator_used) = self.compose(text, &results).await;
        let knowledge_base_size = self.repository.count().await.unwrap_or(0);

        let stats = AnswerStats {
            results_found: results.len(),
            knowledge_base_size,
            answer_length: answer.chars().count(),
            generator_used,
            storage: STORAGE_LABEL,
        };

        Ok(AnswerOutcome {
            results,
            answer,
            stats,
        })
    }

    async fn compose(&self, query: &str, results: &[SearchResult]) -> (String, bool) {
        if results.is_empty() {
            return (extractive::INSUFFICIENT_INFO_MESSAGE.to_string(), false);
        }

        if let Some(generator) = &self.generator {
            let prompt = generator::build_prompt(query, results);
            match tokio::time::timeout(self.generation_timeout, generator.generate(&prompt)).await
            {
                Ok(Ok(reply)) => {
                    let cleaned = generator::scrub_reply(&reply);
                    if !cleaned.is_empty() {
                        return (cleaned, true);
                    }
                    warn!("Generator returned an empty reply, using extractive synthesis");
                }
                Ok(Err(e)) => {
                    warn!("Generation failed, using extractive synthesis: {e:#}");
                }
                Err(_) => {
                    warn!(
                        "Generation exceeded {}s, using extractive synthesis",
                        self.generation_timeout.as_secs()
                    );
                }
            }
        }

        let scoring = Scoring {
            relevance_threshold: self.config.relevance_threshold,
            title_bonus: self.config.title_bonus,
            length_bonus: self.config.length_bonus,
        };
        (
            extractive::synthesize(query, results, self.config.context_documents, &scoring),
            false,
        )
    }
}
