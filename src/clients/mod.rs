//! Client traits and wire types for the three external capabilities.
//!
//! The pipeline talks to its collaborators exclusively through the traits in
//! this module so tests can substitute in-process fakes:
//!
//! - [`Embedder`]: text -> fixed-dimension vector
//! - [`TextGenerator`]: prompt -> answer text
//! - [`VectorIndex`]: collection setup, point upsert, nearest-neighbor search
//!
//! `ollama` implements the first two against an Ollama server, `qdrant`
//! implements the third against the Qdrant REST API.

pub mod ollama;
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use ollama::OllamaClient;
pub use qdrant::QdrantClient;

/// Failure of a model-server call (embedding or generation).
///
/// No variant is retried; the pipeline surfaces these to the HTTP caller
/// unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model service unreachable: {0}")]
    Unavailable(String),

    #[error("model service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected model response: {0}")]
    Malformed(String),
}

/// Failure of a vector-index call. Same shape as [`ModelError`], kept
/// separate so callers can tell which collaborator fell over.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("vector index unreachable: {0}")]
    Unavailable(String),

    #[error("vector index returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected index response: {0}")]
    Malformed(String),
}

/// Fixed per-deployment collection schema. Established once at bootstrap and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub vector_dim: usize,
    pub distance: Distance,
}

/// Distance metric for nearest-neighbor search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Euclid,
    Dot,
}

impl Distance {
    /// Wire name as Qdrant expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Euclid => "Euclid",
            Distance::Dot => "Dot",
        }
    }
}

/// A passage headed for the index: id, embedding, and the original text as
/// payload. Not retained locally after upsert.
#[derive(Debug, Clone)]
pub struct PassagePoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub text: String,
}

/// A single search hit, ordered by descending similarity. `text` is `None`
/// when the stored payload carries no text field.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub text: Option<String>,
}

/// Converts text into a fixed-dimension embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;
}

/// Generates answer text from a fully composed prompt. Non-streaming: the
/// call resolves only once the complete answer is available.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Vector-index operations needed by the pipelines.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist. Must be safe to call on
    /// every startup: an existing collection is left untouched, whatever its
    /// schema (create-if-absent, never validate-if-present).
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), IndexError>;

    /// Insert or overwrite the point at `point.id`.
    async fn upsert(&self, point: PassagePoint) -> Result<(), IndexError>;

    /// Up to `limit` nearest neighbors by the collection's distance metric,
    /// descending similarity. An empty collection yields an empty vec, not
    /// an error.
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, IndexError>;
}
