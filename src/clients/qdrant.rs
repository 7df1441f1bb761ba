//! Qdrant REST client: collection bootstrap, point upsert, top-k search.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{CollectionSchema, IndexError, PassagePoint, ScoredPoint, VectorIndex};
use crate::config::QdrantConfig;

/// Thin client over the Qdrant HTTP API. The collection name is fixed at
/// construction; all three operations target it.
#[derive(Debug, Clone)]
pub struct QdrantClient {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantClient {
    pub fn new(config: &QdrantConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .expect("reqwest client with static configuration");

        Self {
            http,
            base_url: config.base_url(),
            collection: config.collection.clone(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, IndexError> {
        let response = request
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| IndexError::Malformed(format!("invalid JSON: {e}")))
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, IndexError> {
        let url = format!("{}/collections", self.base_url);
        let body = self.send(self.http.get(&url)).await?;
        Ok(parse_collection_names(&body)?.iter().any(|n| n == name))
    }
}

#[async_trait]
impl VectorIndex for QdrantClient {
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), IndexError> {
        // Create-if-absent only. An existing collection is trusted as-is;
        // its schema is never re-checked against the configured one.
        if self.collection_exists(&schema.name).await? {
            tracing::debug!(collection = %schema.name, "collection already exists");
            return Ok(());
        }

        tracing::info!(
            collection = %schema.name,
            dim = schema.vector_dim,
            distance = schema.distance.as_str(),
            "creating collection"
        );

        let url = format!("{}/collections/{}", self.base_url, schema.name);
        let payload = json!({
            "vectors": {
                "size": schema.vector_dim,
                "distance": schema.distance.as_str(),
            }
        });
        self.send(self.http.put(&url).json(&payload)).await?;
        Ok(())
    }

    async fn upsert(&self, point: PassagePoint) -> Result<(), IndexError> {
        // wait=true so a query issued right after the insert sees the point.
        let url = format!(
            "{}/collections/{}/points?wait=true",
            self.base_url, self.collection
        );
        let payload = json!({
            "points": [{
                "id": point.id.to_string(),
                "vector": point.vector,
                "payload": { "text": point.text },
            }]
        });
        self.send(self.http.put(&url).json(&payload)).await?;
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let payload = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        let body = self.send(self.http.post(&url).json(&payload)).await?;
        parse_search_hits(body)
    }
}

/// Names from a `GET /collections` response:
/// `{"result": {"collections": [{"name": ...}, ...]}}`.
fn parse_collection_names(value: &Value) -> Result<Vec<String>, IndexError> {
    let collections = value
        .pointer("/result/collections")
        .and_then(Value::as_array)
        .ok_or_else(|| IndexError::Malformed("missing `result.collections` array".into()))?;

    Ok(collections
        .iter()
        .filter_map(|c| c.get("name").and_then(Value::as_str))
        .map(str::to_owned)
        .collect())
}

/// Hits from a points search response:
/// `{"result": [{"id", "score", "payload": {"text"}}]}`. A payload without a
/// text field yields `text: None` rather than an error.
fn parse_search_hits(value: Value) -> Result<Vec<ScoredPoint>, IndexError> {
    let hits = value
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| IndexError::Malformed("missing `result` array".into()))?;

    hits.iter()
        .map(|hit| {
            let id = match hit.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return Err(IndexError::Malformed("hit without `id`".into())),
            };
            let score = hit
                .get("score")
                .and_then(Value::as_f64)
                .ok_or_else(|| IndexError::Malformed("hit without numeric `score`".into()))?
                as f32;
            let text = hit
                .pointer("/payload/text")
                .and_then(Value::as_str)
                .map(str::to_owned);

            Ok(ScoredPoint { id, score, text })
        })
        .collect()
}
