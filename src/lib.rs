//! # SafeQuery — Privacy-First RAG Search Engine
//!
//! Crawls the web for configured topics, redacts personal data from the
//! extracted content, stores deduplicated documents in a local vector store,
//! and answers natural-language queries by retrieving relevant documents and
//! synthesizing a concise answer — extractively when no generative model is
//! available.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, and defaults
//! - **[`document`]** — Crawled-document record and its stable identity key
//! - **[`store`]** — SQLite + sqlite-vec vector store (insert, count, nearest)
//! - **[`embedder`]** — Text embedding behind a narrow trait (Ollama client + mock)
//! - **[`crawler`]** — Topic crawling: URL discovery, content extraction, sanitization
//! - **[`repository`]** — Deduplicating, idempotent document ingestion
//! - **[`answer`]** — Retrieval, extractive synthesis, and the generation fallback chain
//! - **[`api`]** — HTTP endpoints (axum): search, suggest, feedback, stats, health
//! - **[`audit`]** — Anonymous (digest-only) query and feedback logging
//! - **[`bootstrap`]** — Sample-document seeding for an empty knowledge base

pub mod answer;
pub mod api;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod crawler;
pub mod document;
pub mod embedder;
pub mod repository;
pub mod store;
