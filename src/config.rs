//! Layered configuration: optional `ragserve` file source, `RAGSERVE__*`
//! environment overrides, plus the conventional bare variables
//! (`OLLAMA_HOST`, `OLLAMA_PORT`, `QDRANT_HOST`, `QDRANT_PORT`) honored for
//! drop-in compatibility with existing deployments.
//!
//! Everything is read once at startup; there is no runtime reconfiguration.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clients::{CollectionSchema, Distance};

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds. A query chains up to three
    /// sequential upstream calls (embed, search, generate), each bounded by
    /// its own client timeout, so this must exceed the summed upstream
    /// budget or a slow-but-healthy generation gets cut off with a 408.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Enable CORS (the presentation UI is served from a separate origin)
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level / env-filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Ollama model server
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Qdrant vector index
    #[serde(default)]
    pub qdrant: QdrantConfig,
}

/// Ollama connection and model selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,

    #[serde(default = "default_ollama_port")]
    pub port: u16,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_generate_model")]
    pub generate_model: String,

    /// Per-call timeout; a timeout surfaces as an unavailable upstream.
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

/// Qdrant connection and collection schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QdrantConfig {
    #[serde(default = "default_qdrant_host")]
    pub host: String,

    #[serde(default = "default_qdrant_port")]
    pub port: u16,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    #[serde(default = "default_distance")]
    pub distance: Distance,

    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            ollama: OllamaConfig::default(),
            qdrant: QdrantConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            port: default_ollama_port(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            host: default_qdrant_host(),
            port: default_qdrant_port(),
            collection: default_collection(),
            vector_dim: default_vector_dim(),
            distance: default_distance(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional `ragserve` file and environment
    /// variables, then apply the bare conventional overrides.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("ragserve").required(false))
            .add_source(config::Environment::with_prefix("RAGSERVE").separator("__"));

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_bare_env_overrides()?;
        Ok(config)
    }

    /// Honor `OLLAMA_HOST`/`OLLAMA_PORT`/`QDRANT_HOST`/`QDRANT_PORT` the way
    /// prior deployments of this service set them.
    fn apply_bare_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Ok(port) = std::env::var("OLLAMA_PORT") {
            self.ollama.port = port.parse()?;
        }
        if let Ok(host) = std::env::var("QDRANT_HOST") {
            self.qdrant.host = host;
        }
        if let Ok(port) = std::env::var("QDRANT_PORT") {
            self.qdrant.port = port.parse()?;
        }
        Ok(())
    }

    /// Socket address to bind to.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl OllamaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl QdrantConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// The collection schema this deployment bootstraps and serves against.
    pub fn schema(&self) -> CollectionSchema {
        CollectionSchema {
            name: self.collection.clone(),
            vector_dim: self.vector_dim,
            distance: self.distance,
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    // embed + search + generate at 30s each, plus slack
    120
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ollama_host() -> String {
    "ollama".to_string()
}

fn default_ollama_port() -> u16 {
    11434
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_generate_model() -> String {
    "llama3".to_string()
}

fn default_qdrant_host() -> String {
    "qdrant".to_string()
}

fn default_qdrant_port() -> u16 {
    6333
}

fn default_collection() -> String {
    "rag-collection".to_string()
}

fn default_vector_dim() -> usize {
    768
}

fn default_distance() -> Distance {
    Distance::Cosine
}

fn default_upstream_timeout_secs() -> u64 {
    30
}
