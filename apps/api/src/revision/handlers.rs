use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::{classify_failure, AgentError};
use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::state::AppState;

/// Upper bound on total handling time, sized for a single long model call.
/// A request past this point is abandoned, not retried.
pub const REVAMP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct RevampRequest {
    pub resume: Option<Resume>,
    pub message: Option<String>,
    #[serde(rename = "jobUrl")]
    pub job_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevampResponse {
    pub result: Resume,
    pub message: String,
}

/// POST /api/revamp
///
/// Takes the current structured resume, a free-text instruction, and an
/// optional job URL; returns the revised resume plus the agent's explanation
/// of what changed.
pub async fn handle_revamp(
    State(state): State<AppState>,
    payload: Result<Json<RevampRequest>, JsonRejection>,
) -> Result<Json<RevampResponse>, AppError> {
    // A body that never parsed is a top-level failure, not a typed one; it
    // still rides the error envelope with the original message appended.
    let Json(request) =
        payload.map_err(|e| AppError::Unexpected(format!("Failed to revamp resume: {e}")))?;

    let resume = request
        .resume
        .ok_or_else(|| AppError::Validation("Resume data is required".to_string()))?;

    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let job_url = request.job_url.unwrap_or_default();

    info!(has_job_url = !job_url.is_empty(), "Revamping resume");

    let revise = state.agent.revise(&resume, message.trim(), &job_url);
    let revision = match tokio::time::timeout(REVAMP_TIMEOUT, revise).await {
        Ok(outcome) => outcome.map_err(|e| classify_failure("Failed to revamp resume", e))?,
        Err(_) => {
            return Err(classify_failure(
                "Failed to revamp resume",
                AgentError::Timeout,
            ))
        }
    };

    Ok(Json(RevampResponse {
        result: revision.resume,
        message: revision.message,
    }))
}
