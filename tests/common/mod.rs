//! Shared in-process fakes for the three external capabilities.
#![allow(dead_code)] // each test target uses a different subset

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ragserve::clients::{
    CollectionSchema, Embedder, IndexError, ModelError, PassagePoint, ScoredPoint, TextGenerator,
    VectorIndex,
};
use ragserve::config::AppConfig;
use ragserve::AppState;

pub const TEST_DIM: usize = 8;

/// Deterministic embedder: identical text always produces the identical
/// vector, so a passage is maximally cosine-similar to itself.
pub struct FakeEmbedder {
    pub dim: usize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self { dim: TEST_DIM }
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let mut seed = text
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
                (acc ^ u64::from(b)).wrapping_mul(0x1000_0000_01b3)
            });
        Ok((0..self.dim)
            .map(|_| {
                let bits = splitmix64(&mut seed);
                (bits as f64 / u64::MAX as f64) as f32 - 0.5
            })
            .collect())
    }
}

/// Embedder that always fails, simulating an unreachable model server.
pub struct UnreachableEmbedder;

#[async_trait]
impl Embedder for UnreachableEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ModelError> {
        Err(ModelError::Unavailable("connection refused".to_string()))
    }
}

/// Embedder that returns the wrong dimensionality.
pub struct WrongDimEmbedder {
    pub dim: usize,
}

#[async_trait]
impl Embedder for WrongDimEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ModelError> {
        Ok(vec![0.1; self.dim])
    }
}

/// Generator that records every prompt it receives and returns a canned
/// answer.
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
    pub answer: String,
}

impl RecordingGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            answer: answer.to_string(),
        }
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answer.clone())
    }
}

/// In-memory vector index with real cosine scoring and create-if-absent
/// collection semantics.
pub struct InMemoryIndex {
    collections: Mutex<HashSet<String>>,
    points: Mutex<HashMap<String, (Vec<f32>, Option<String>)>>,
    pub create_calls: AtomicUsize,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashSet::new()),
            points: Mutex::new(HashMap::new()),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.lock().unwrap().len()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), IndexError> {
        let mut collections = self.collections.lock().unwrap();
        if !collections.contains(&schema.name) {
            collections.insert(schema.name.clone());
            self.create_calls.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn upsert(&self, point: PassagePoint) -> Result<(), IndexError> {
        self.points
            .lock()
            .unwrap()
            .insert(point.id.to_string(), (point.vector, Some(point.text)));
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        let points = self.points.lock().unwrap();
        let mut hits: Vec<ScoredPoint> = points
            .iter()
            .map(|(id, (v, text))| ScoredPoint {
                id: id.clone(),
                score: cosine(vector, v),
                text: text.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Index whose every call fails, simulating an unreachable Qdrant.
pub struct UnreachableIndex;

#[async_trait]
impl VectorIndex for UnreachableIndex {
    async fn ensure_collection(&self, _schema: &CollectionSchema) -> Result<(), IndexError> {
        Err(IndexError::Unavailable("connection refused".to_string()))
    }

    async fn upsert(&self, _point: PassagePoint) -> Result<(), IndexError> {
        Err(IndexError::Unavailable("connection refused".to_string()))
    }

    async fn search(&self, _vector: &[f32], _limit: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        Err(IndexError::Unavailable("connection refused".to_string()))
    }
}

/// Config whose dimensionality matches the fakes.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.qdrant.vector_dim = TEST_DIM;
    config
}

/// State assembled from the standard fakes.
pub fn test_state(
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    index: Arc<dyn VectorIndex>,
) -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), embedder, generator, index))
}
