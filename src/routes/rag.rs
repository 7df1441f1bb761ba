use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

/// Request to answer a question against the stored passages
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The natural-language question
    pub query: String,
}

/// Answer plus the passage it was grounded on
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer, or the fixed no-match message
    pub response: String,

    /// Retrieved context text; empty when nothing matched
    pub context: String,
}

/// Request to ingest a text passage
#[derive(Debug, Serialize, Deserialize)]
pub struct InsertRequest {
    /// The passage text to embed and store
    pub text: String,
}

/// Ingestion acknowledgment
#[derive(Debug, Serialize, Deserialize)]
pub struct InsertResponse {
    pub status: String,

    /// Identifier assigned to the stored passage
    pub id: Uuid,
}

/// Answer a question from the single most similar stored passage
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<impl IntoResponse> {
    let answer = state.pipeline.answer(&request.query).await?;

    Ok(Json(QueryResponse {
        response: answer.response,
        context: answer.context,
    }))
}

/// Embed a passage and store it in the vector index
pub async fn insert(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InsertRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = state.pipeline.ingest(&request.text).await?;

    Ok(Json(InsertResponse {
        status: "ok".to_string(),
        id,
    }))
}
