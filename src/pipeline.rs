//! Query and ingestion pipelines.
//!
//! Both flows are strictly sequential chains of upstream calls: each stage
//! depends on the previous stage's output, so there is no intra-request
//! parallelism. No stage retries; the first failure aborts the request.

use std::sync::Arc;

use uuid::Uuid;

use crate::clients::{
    Embedder, IndexError, ModelError, PassagePoint, ScoredPoint, TextGenerator, VectorIndex,
};
use crate::config::AppConfig;

/// Canned answer for a query against an index with no matching content.
/// Fixed constant, never produced by the generation model.
pub const NO_MATCH_RESPONSE: &str = "No relevant context found.";

/// Failures of a pipeline run. Wraps the collaborator errors and adds the
/// validation failures the pipeline itself detects.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input text must not be empty")]
    EmptyInput,

    #[error("embedding dimensionality mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// The answer to a query: generated text plus the retrieved context (empty
/// when the index produced no hit).
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub response: String,
    pub context: String,
}

/// Orchestrates embed -> search -> generate (query) and embed -> upsert
/// (ingest). Collaborators are injected at construction so tests can swap in
/// fakes; the pipeline itself holds no mutable state.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    index: Arc<dyn VectorIndex>,
    vector_dim: usize,
}

impl RagPipeline {
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            embedder,
            generator,
            index,
            vector_dim: config.qdrant.vector_dim,
        }
    }

    /// Answer a question from the single most similar stored passage.
    ///
    /// An empty index is a success path: the caller gets the fixed
    /// [`NO_MATCH_RESPONSE`] with empty context, and the generation model is
    /// never consulted.
    pub async fn answer(&self, question: &str) -> Result<Answer, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let vector = self.embed_checked(question).await?;
        let hits = self.index.search(&vector, 1).await?;

        let Some(hit) = hits.into_iter().next() else {
            tracing::debug!("no hits for query, returning canned response");
            return Ok(Answer {
                response: NO_MATCH_RESPONSE.to_string(),
                context: String::new(),
            });
        };

        let context = hit_context(&hit);
        let prompt = compose_prompt(&context, question);
        let response = self.generator.generate(&prompt).await?;

        Ok(Answer { response, context })
    }

    /// Embed `text` and store it under a fresh identifier. Returns the
    /// assigned id.
    pub async fn ingest(&self, text: &str) -> Result<Uuid, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let vector = self.embed_checked(text).await?;
        let id = Uuid::new_v4();
        self.index
            .upsert(PassagePoint {
                id,
                vector,
                text: text.to_string(),
            })
            .await?;

        tracing::info!(%id, "passage ingested");
        Ok(id)
    }

    /// Embed and enforce the collection's dimensionality invariant before
    /// the vector can reach the index.
    async fn embed_checked(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let vector = self.embedder.embed(text).await?;
        if vector.len() != self.vector_dim {
            return Err(PipelineError::DimensionMismatch {
                expected: self.vector_dim,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

/// Context text of a hit; a payload without a text field reads as empty.
fn hit_context(hit: &ScoredPoint) -> String {
    hit.text.clone().unwrap_or_default()
}

/// Fixed prompt template: instruction, retrieved context, literal question.
pub fn compose_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question using only the context below.\n\n\
         Context:\n{context}\n\n\
         Question: {question}"
    )
}
