//! Ollama HTTP client: embeddings and non-streaming generation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Embedder, ModelError, TextGenerator};
use crate::config::OllamaConfig;

/// Client for a single Ollama server, used for both the embedding model and
/// the generation model. Holds no per-request state; one outbound call per
/// invocation.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    embed_model: String,
    generate_model: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .expect("reqwest client with static configuration");

        Self {
            http,
            base_url: config.base_url(),
            embed_model: config.embed_model.clone(),
            generate_model: config.generate_model.clone(),
        }
    }

    async fn post_json(&self, path: &str, payload: Value) -> Result<Value, ModelError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ModelError::Malformed(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let payload = json!({
            "model": self.embed_model,
            "prompt": text,
        });
        let response = self.post_json("/api/embeddings", payload).await?;
        parse_embedding(response)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let payload = json!({
            "model": self.generate_model,
            "prompt": prompt,
            "stream": false,
        });
        let response = self.post_json("/api/generate", payload).await?;
        parse_generation(response)
    }
}

/// Extract the `embedding` array from an `/api/embeddings` response body.
fn parse_embedding(value: Value) -> Result<Vec<f32>, ModelError> {
    let entries = value
        .get("embedding")
        .and_then(Value::as_array)
        .ok_or_else(|| ModelError::Malformed("missing `embedding` array".into()))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ModelError::Malformed("non-numeric embedding entry".into()))
        })
        .collect()
}

/// Extract the `response` string from an `/api/generate` response body.
fn parse_generation(value: Value) -> Result<String, ModelError> {
    value
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ModelError::Malformed("missing `response` string".into()))
}
