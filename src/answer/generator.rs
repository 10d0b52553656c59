//! Generative answer synthesis via an external model service.
use std::sync::LazyLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};

use super::retriever::SearchResult;
use crate::config::ModelConfig;

/// A generative text service. Entirely optional: when absent, the answer
/// pipeline always synthesizes extractively.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Ollama chat-completion client.
pub struct OllamaGenerator {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            // No client-side timeout: the pipeline bounds generation time
            client: reqwest::Client::new(),
            host: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.generate_model.clone(),
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.host);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "stream": false,
            }))
            .send()
            .await
            .context("generation request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("generation endpoint returned {}", response.status());
        }

        let payload: Value = response
            .json()
            .await
            .context("malformed generation response")?;

        let reply = payload
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .context("generation response missing message content")?;

        Ok(reply.trim().to_string())
    }
}

/// Build the generation prompt from the query and retrieved context.
#[must_use]
pub fn build_prompt(query: &str, documents: &[SearchResult]) -> String {
    let context = documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Using the following context, answer the question concisely and accurately. \
         If the answer is not in the context, state that you don't know.\n\n\
         Context:\n{context}\n\nQuestion: {query}\nAnswer:"
    )
}

static LEAD_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Based on (?:the provided context|the context|the information provided), ")
        .unwrap()
});

/// Strip boilerplate lead-ins models tend to prepend to their replies.
#[must_use]
pub fn scrub_reply(reply: &str) -> String {
    LEAD_IN_RE.replace_all(reply, "").trim().to_string()
}
