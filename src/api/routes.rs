//! Request handlers: search, suggestions, feedback, stats, health.
use axum::Json;
use axum::extract::{Query as QueryParams, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{ApiError, AppState};
use crate::answer::{AnswerStats, Query, STORAGE_LABEL};
use crate::document::truncate_chars;

/// Result content is previewed to this many characters in responses.
const CONTENT_PREVIEW_CHARS: usize = 500;
const MAX_SUGGESTIONS: usize = 6;

// ── Request / response shapes ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ResultView {
    pub title: String,
    pub content: String,
    pub url: String,
    pub score: f64,
    pub source: crate::answer::retriever::Source,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ResultView>,
    pub answer: String,
    pub privacy_log: String,
    pub stats: AnswerStats,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "SafeQuery: Privacy-First RAG Search Engine",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Dynamic web crawling with privacy protection",
        "endpoints": {
            "search": "POST /search - Main search with RAG",
            "suggest": "GET /suggest - Get search suggestions",
            "feedback": "POST /feedback - Submit user feedback",
            "stats": "GET /stats - Get knowledge base statistics"
        }
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = Query {
        text: request.query,
        max_results: request.max_results,
    };

    // Anonymous logging, off the request path
    {
        let audit = state.audit.clone();
        let text = query.text.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = audit.record_query(&text) {
                warn!("Failed to record query log entry: {e:#}");
            }
        });
    }

    info!("Processing search query (length: {})", query.text.trim().chars().count());

    let outcome = state.pipeline.answer(&query).await?;

    let privacy_log = format!(
        "Query processed with privacy protection. Found {} relevant results from {} storage. \
         Total documents in knowledge base: {}",
        outcome.stats.results_found, outcome.stats.storage, outcome.stats.knowledge_base_size
    );

    let results = outcome
        .results
        .into_iter()
        .map(|r| ResultView {
            title: r.title,
            content: preview(&r.content),
            url: r.url,
            score: r.score,
            source: r.source,
        })
        .collect::<Vec<_>>();

    info!(
        "Search completed: {} results, answer length: {}",
        results.len(),
        outcome.stats.answer_length
    );

    Ok(Json(SearchResponse {
        results,
        answer: outcome.answer,
        privacy_log,
        stats: outcome.stats,
    }))
}

pub async fn suggest(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SuggestParams>,
) -> Json<Value> {
    let query = params.query.trim();
    if query.is_empty() {
        return Json(json!({ "suggestions": [] }));
    }

    let mut suggestions = base_suggestions(query);

    // Enrich with knowledge-base titles the query does not already mention
    if let Ok(titles) = state.repository.recent_titles(3).await {
        let query_lower = query.to_lowercase();
        for title in titles {
            if !title.is_empty() && !title.to_lowercase().contains(&query_lower) {
                suggestions.push(format!("What is {title}?"));
            }
        }
    }

    Json(json!({ "suggestions": dedupe_capped(suggestions, MAX_SUGGESTIONS) }))
}

pub async fn feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = request.feedback.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Feedback cannot be empty.".to_string()));
    }

    let audit = state.audit.clone();
    let id = tokio::task::spawn_blocking(move || audit.record_feedback(&text))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(format!("{e:#}")))?;

    info!("Feedback received: ID {id}");
    Ok(Json(json!({
        "message": "Feedback received successfully.",
        "feedback_id": id
    })))
}

pub async fn stats(State(state): State<AppState>) -> Json<Value> {
    let total = match state.repository.count().await {
        Ok(total) => total,
        Err(e) => {
            warn!("Stats error: {e:#}");
            return Json(json!({ "error": "Could not retrieve statistics" }));
        }
    };

    Json(json!({
        "knowledge_base": {
            "total_documents": total,
            "storage_type": STORAGE_LABEL
        },
        "privacy_features": [
            "Anonymous query logging",
            "Content sanitization",
            "User data anonymization",
            "Privacy-first web crawling",
            "Local data processing"
        ],
        "capabilities": [
            "Dynamic web content crawling",
            "Multi-document RAG search",
            "Real-time knowledge base updates",
            "Diverse topic handling"
        ]
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    match state.repository.count().await {
        Ok(total) => Json(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
            "knowledge_base_size": total,
            "storage_type": STORAGE_LABEL
        })),
        Err(e) => Json(json!({
            "status": "degraded",
            "timestamp": Utc::now().to_rfc3339(),
            "error": e.to_string()
        })),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn preview(content: &str) -> String {
    if content.chars().count() > CONTENT_PREVIEW_CHARS {
        format!("{}...", truncate_chars(content, CONTENT_PREVIEW_CHARS))
    } else {
        content.to_string()
    }
}

fn base_suggestions(query: &str) -> Vec<String> {
    vec![
        format!("What is {query}?"),
        format!("How does {query} work?"),
        format!("{query} applications"),
        format!("Explain {query}"),
    ]
}

/// Remove duplicates preserving first occurrence, capped at `max`.
fn dedupe_capped(suggestions: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for suggestion in suggestions {
        if unique.len() >= max {
            break;
        }
        if seen.insert(suggestion.clone()) {
            unique.push(suggestion);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerPipeline;
    use crate::answer::retriever::Retriever;
    use crate::config::AnswerConfig;
    use crate::audit::AuditLog;
    use crate::document::Document;
    use crate::embedder::Embedder;
    use crate::embedder::mock::MockEmbedder;
    use crate::repository::DocumentRepository;
    use crate::store::Db;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex as TokioMutex;

    async fn state_with(seed: &[Document], dir: &std::path::Path) -> AppState {
        let embedder: Arc<dyn Embedder> = Arc::new(MockEmbedder::default());
        let repository = Arc::new(DocumentRepository::new(
            Arc::new(TokioMutex::new(Db::open_in_memory().unwrap())),
            embedder.clone(),
        ));
        repository.store(seed).await.unwrap();

        let pipeline = Arc::new(AnswerPipeline::new(
            Retriever::new(repository.clone(), embedder),
            repository.clone(),
            None,
            AnswerConfig::default(),
            Duration::from_secs(1),
        ));
        let audit = Arc::new(AuditLog::new(
            dir.join("queries.txt"),
            dir.join("feedback.txt"),
        ));

        AppState {
            pipeline,
            repository,
            audit,
        }
    }

    fn seed_doc() -> Document {
        Document {
            title: "Machine Learning".to_string(),
            content: "Machine learning is a subset of artificial intelligence that builds models from data."
                .to_string(),
            url: "https://example.com/ml".to_string(),
            domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "x".repeat(600);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), CONTENT_PREVIEW_CHARS + 3);

        let short = "short content";
        assert_eq!(preview(short), short);
    }

    #[test]
    fn test_dedupe_capped() {
        let out = dedupe_capped(
            vec![
                "a".to_string(),
                "b".to_string(),
                "a".to_string(),
                "c".to_string(),
            ],
            2,
        );
        assert_eq!(out, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_search_handler_returns_results_and_answer() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[seed_doc()], dir.path()).await;

        let response = search(
            State(state),
            Json(SearchRequest {
                query: "What is machine learning?".to_string(),
                max_results: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.results.len(), 1);
        assert!(response.0.answer.contains("subset of artificial intelligence"));
        assert!(response.0.privacy_log.contains("privacy protection"));
        assert_eq!(response.0.stats.knowledge_base_size, 1);
    }

    #[tokio::test]
    async fn test_search_handler_rejects_short_query() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[], dir.path()).await;

        let err = search(
            State(state),
            Json(SearchRequest {
                query: " x ".to_string(),
                max_results: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_suggest_handler_shapes_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[seed_doc()], dir.path()).await;

        let response = suggest(
            State(state),
            QueryParams(SuggestParams {
                query: "rust".to_string(),
            }),
        )
        .await;

        let suggestions = response.0["suggestions"].as_array().unwrap().clone();
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
        assert_eq!(suggestions[0], "What is rust?");
        // Knowledge-base title surfaced because it does not mention the query
        assert!(
            suggestions
                .iter()
                .any(|s| s == "What is Machine Learning?")
        );
    }

    #[tokio::test]
    async fn test_suggest_handler_empty_query() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[], dir.path()).await;

        let response = suggest(
            State(state),
            QueryParams(SuggestParams {
                query: "  ".to_string(),
            }),
        )
        .await;
        assert!(response.0["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_handler_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[], dir.path()).await;

        let response = feedback(
            State(state.clone()),
            Json(FeedbackRequest {
                feedback: "useful answers".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0["message"], "Feedback received successfully.");
        assert!(response.0["feedback_id"].as_str().unwrap().len() == 16);

        let err = feedback(
            State(state),
            Json(FeedbackRequest {
                feedback: "   ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[seed_doc()], dir.path()).await;

        let response = health(State(state)).await;
        assert_eq!(response.0["status"], "healthy");
        assert_eq!(response.0["knowledge_base_size"], 1);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&[seed_doc()], dir.path()).await;

        let response = stats(State(state)).await;
        assert_eq!(response.0["knowledge_base"]["total_documents"], 1);
        assert_eq!(response.0["knowledge_base"]["storage_type"], STORAGE_LABEL);
    }
}
