//! API route handlers.
//!
//! - `health`: liveness and readiness probes
//! - `rag`: the query and ingestion endpoints

pub mod health;
pub mod rag;

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::{ApiError, ApiResult};

/// API version and base info (GET /, unauthenticated).
pub async fn api_info() -> ApiResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "ragserve",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/query",
            "/insert",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler for undefined routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
