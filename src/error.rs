use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing error type. Wraps pipeline failures and adds the surface-level
/// cases (bad request, unknown route, internal).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status for this error. Upstream model/index failures map to 502:
    /// this service is acting as a gateway to those collaborators.
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Pipeline(PipelineError::EmptyInput) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(PipelineError::Model(_))
            | ApiError::Pipeline(PipelineError::Index(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::DimensionMismatch { .. })
            | ApiError::Internal(_)
            | ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Stable machine-readable error code.
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::Pipeline(PipelineError::EmptyInput) => {
                "BAD_REQUEST"
            }
            ApiError::Pipeline(PipelineError::Model(_)) => "MODEL_ERROR",
            ApiError::Pipeline(PipelineError::Index(_)) => "INDEX_ERROR",
            ApiError::Pipeline(PipelineError::DimensionMismatch { .. }) => "DIMENSION_MISMATCH",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ApiError {
    fn from(err: std::net::AddrParseError) -> Self {
        ApiError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
