/// Configuration module for SafeQuery.
///
/// Handles loading, validating, and providing default configuration values.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_db_path() -> String {
    "./safequery.db".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_topics() -> Vec<String> {
    vec![
        "latest advancements in AI".to_string(),
        "python programming best practices".to_string(),
        "climate change solutions".to_string(),
    ]
}

fn default_blocked_domains() -> Vec<String> {
    [
        "facebook.com",
        "twitter.com",
        "instagram.com",
        "youtube.com",
        "linkedin.com",
        "reddit.com",
        "pinterest.com",
        "tiktok.com",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_max_articles() -> usize {
    2
}

fn default_interval_hours() -> u64 {
    4
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_min_content_length() -> usize {
    100
}

fn default_max_content_length() -> usize {
    4000
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_embed_model() -> String {
    "all-minilm".to_string()
}

fn default_generate_model() -> String {
    "gemma:2b".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_true() -> bool {
    true
}

fn default_generation_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> usize {
    5
}

fn default_context_documents() -> usize {
    3
}

fn default_relevance_threshold() -> f64 {
    0.2
}

fn default_title_bonus() -> f64 {
    0.3
}

fn default_length_bonus() -> f64 {
    0.1
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub answer: AnswerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CrawlConfig {
    /// Seed queries used to proactively populate the knowledge base.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Hosts containing any of these entries are never crawled.
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,

    #[serde(default = "default_max_articles")]
    pub max_articles_per_topic: usize,

    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extractions shorter than this are rejected as low quality.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Stored content is capped at this length to bound embedding cost.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_generate_model")]
    pub generate_model: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// When false the answer pipeline always uses extractive synthesis.
    #[serde(default = "default_true")]
    pub generation_enabled: bool,

    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnswerConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// How many top-ranked documents feed answer synthesis.
    #[serde(default = "default_context_documents")]
    pub context_documents: usize,

    /// Minimum sentence relevance score kept by the extractive synthesizer.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    /// Score bonus for sentences whose document title matches a query keyword.
    #[serde(default = "default_title_bonus")]
    pub title_bonus: f64,

    /// Score bonus for sentences long enough to carry context.
    #[serde(default = "default_length_bonus")]
    pub length_bonus: f64,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            http: HttpConfig::default(),
            crawl: CrawlConfig::default(),
            model: ModelConfig::default(),
            answer: AnswerConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            blocked_domains: default_blocked_domains(),
            max_articles_per_topic: default_max_articles(),
            interval_hours: default_interval_hours(),
            request_timeout_secs: default_request_timeout_secs(),
            min_content_length: default_min_content_length(),
            max_content_length: default_max_content_length(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ollama_host: default_ollama_host(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
            dimensions: default_dimensions(),
            generation_enabled: default_true(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            context_documents: default_context_documents(),
            relevance_threshold: default_relevance_threshold(),
            title_bonus: default_title_bonus(),
            length_bonus: default_length_bonus(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and optionally
    /// generates a template file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.crawl.topics.is_empty(),
            "at least one crawl topic must be configured"
        );
        anyhow::ensure!(
            self.crawl.max_articles_per_topic > 0,
            "crawl.max_articles_per_topic must be positive"
        );
        anyhow::ensure!(
            self.crawl.min_content_length < self.crawl.max_content_length,
            "crawl.min_content_length must be below crawl.max_content_length"
        );
        anyhow::ensure!(
            self.model.dimensions > 0,
            "model.dimensions must be positive"
        );
        anyhow::ensure!(
            self.answer.max_results > 0,
            "answer.max_results must be positive"
        );
        anyhow::ensure!(
            self.answer.context_documents > 0,
            "answer.context_documents must be positive"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
