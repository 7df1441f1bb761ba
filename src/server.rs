//! Server initialization and routing.
//!
//! Startup order matters: the collection bootstrap runs before the listener
//! binds, so a process that accepts a connection is guaranteed a collection
//! with the configured schema. Bootstrap failure aborts startup; there is no
//! degraded mode.

use crate::clients::{OllamaClient, QdrantClient, VectorIndex};
use crate::config::AppConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, health, not_found, rag};
use crate::state::AppState;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware.
///
/// Public so integration tests can drive the full middleware stack against a
/// state assembled from fake collaborators.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/query", post(rag::query))
        .route("/insert", post(rag::insert))
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the ragserve HTTP server.
///
/// Initializes logging, wires the Ollama and Qdrant clients, bootstraps the
/// collection, and serves until SIGTERM or Ctrl+C.
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    let ollama = Arc::new(OllamaClient::new(&config.ollama));
    let qdrant: Arc<dyn VectorIndex> = Arc::new(QdrantClient::new(&config.qdrant));

    // Fail fast: no serving without a valid collection.
    let schema = config.qdrant.schema();
    qdrant.ensure_collection(&schema).await?;
    tracing::info!(
        collection = %schema.name,
        dim = schema.vector_dim,
        distance = schema.distance.as_str(),
        "collection ready"
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        ollama.clone(),
        ollama,
        qdrant,
    ));

    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;
    tracing::info!(
        "Starting ragserve on {} (ollama: {}, qdrant: {})",
        addr,
        config.ollama.base_url(),
        config.qdrant.base_url()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
