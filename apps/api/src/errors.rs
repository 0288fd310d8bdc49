use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The document extractor failed outright. Carries the extractor's own
    /// message so the client can see what went wrong with the file.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Extraction succeeded but produced no usable text.
    #[error("Extracted document was empty")]
    EmptyDocument,

    /// The AI call failed because the API key is missing or invalid.
    /// Kept distinct from `Agent` so operators can spot a bad deploy quickly.
    #[error("Agent credentials not configured")]
    AgentConfig,

    /// Any other structuring/revision agent failure. The message is already
    /// wrapped with route context by the caller.
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    /// Anything escaping the typed paths, e.g. a request body that never
    /// parsed. Unlike `Internal`, the original message is surfaced, already
    /// wrapped with route context by the caller.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(msg) => (
                StatusCode::BAD_REQUEST,
                "EXTRACTION_ERROR",
                format!("Failed to parse document: {msg}"),
            ),
            AppError::EmptyDocument => (
                StatusCode::BAD_REQUEST,
                "EXTRACTION_ERROR",
                "Failed to extract text from document. The file might be empty or corrupted."
                    .to_string(),
            ),
            AppError::AgentConfig => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AGENT_CONFIG_ERROR",
                "Google AI API key is not configured. Please set GOOGLE_GENERATIVE_AI_API_KEY environment variable."
                    .to_string(),
            ),
            AppError::Agent(msg) => {
                tracing::error!("Agent error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AGENT_ERROR",
                    msg.clone(),
                )
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Unexpected(msg) => {
                tracing::error!("Unexpected error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UNEXPECTED_ERROR",
                    msg.clone(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
