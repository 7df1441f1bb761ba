use std::sync::Arc;

use crate::clients::{Embedder, TextGenerator, VectorIndex};
use crate::config::AppConfig;
use crate::pipeline::RagPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration established at bootstrap
    pub config: Arc<AppConfig>,

    /// The RAG pipeline (shared across requests, no mutable state)
    pub pipeline: Arc<RagPipeline>,
}

impl AppState {
    /// Create state from explicit collaborators. Tests inject fakes here;
    /// production wiring lives in `server::start_server`.
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        let pipeline = Arc::new(RagPipeline::new(&config, embedder, generator, index));
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}
