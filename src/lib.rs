//! ragserve - a minimal retrieval-augmented-generation orchestration service.
//!
//! Accepts a natural-language question, retrieves the single most similar
//! previously stored passage from a Qdrant collection, and asks a generation
//! model to answer using that passage as context. An ingestion path embeds
//! arbitrary text and stores it for later retrieval.
//!
//! # Endpoints
//!
//! - `POST /query` - `{query}` -> `{response, context}`
//! - `POST /insert` - `{text}` -> `{status: "ok", id}`
//! - `GET /` - API information
//! - `GET /health` - liveness probe
//! - `GET /ready` - readiness probe
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ragserve::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     ragserve::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The pipeline chains three external capabilities through trait objects so
//! each can be faked in tests: an [`clients::Embedder`] and
//! [`clients::TextGenerator`] (Ollama) and a [`clients::VectorIndex`]
//! (Qdrant). A query flows embed -> search -> generate; an ingest flows
//! embed -> upsert. The target collection is created at startup if absent,
//! before the first request is accepted.

pub mod clients;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use pipeline::{Answer, PipelineError, RagPipeline, NO_MATCH_RESPONSE};
pub use server::{build_router, start_server};
pub use state::AppState;
