/// Ollama-backed embedder.
///
/// Thin HTTP client over the `/api/embeddings` endpoint; the model itself
/// runs inside the Ollama server.
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Embedder, EmbedderError};
use crate::config::ModelConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OllamaEmbedder {
    client: reqwest::Client,
    host: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &ModelConfig) -> Result<Self, EmbedderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmbedderError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            host: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.embed_model.clone(),
            dimensions: config.dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let url = format!("{}/api/embeddings", self.host);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|e| EmbedderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmbedderError::RequestFailed(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| EmbedderError::MalformedResponse(e.to_string()))?;

        let values = payload
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                EmbedderError::MalformedResponse("missing embedding field".to_string())
            })?;

        let vector: Vec<f32> = values
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect();

        if vector.len() != self.dimensions {
            return Err(EmbedderError::MalformedResponse(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                vector.len()
            )));
        }

        Ok(vector)
    }

    // The embeddings endpoint takes one prompt per call; batches are issued
    // sequentially through the single shared client.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let mut config = ModelConfig::default();
        config.ollama_host = "http://localhost:11434/".to_string();
        let embedder = OllamaEmbedder::new(&config).unwrap();
        assert_eq!(embedder.host, "http://localhost:11434");
        assert_eq!(embedder.dimensions(), 384);
    }
}
