//! Pre-auth draft handoff.
//!
//! A visitor can compose a submission (instruction, optional job URL,
//! optional resume file) before signing in. Phase 1 parks the draft under an
//! opaque token; phase 2, after authentication, claims it exactly once.
//! Storage is best-effort: no retry, no encryption, a short TTL enforced
//! lazily on read.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::session::DraftRow;
use crate::state::AppState;

/// How long an unclaimed draft stays claimable.
const DRAFT_TTL_MINUTES: i64 = 30;

/// A draft submission with the file re-encoded as text-safe base64 so the
/// whole draft serializes to one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSubmission {
    #[serde(default)]
    pub job_url: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_data: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl DraftSubmission {
    /// A draft needs an instruction or a file; the job URL is always optional.
    pub fn is_valid(&self) -> bool {
        !self.message.trim().is_empty() || self.file_data.is_some()
    }

    /// Builds a draft from raw parts, base64-encoding the file.
    pub fn from_parts(
        job_url: &str,
        message: &str,
        file: Option<(&str, &str, &[u8])>,
    ) -> Self {
        let (file_data, file_name, file_type) = match file {
            Some((name, mime, bytes)) => (
                Some(BASE64.encode(bytes)),
                Some(name.to_string()),
                Some(mime.to_string()),
            ),
            None => (None, None, None),
        };
        DraftSubmission {
            job_url: job_url.trim().to_string(),
            message: message.trim().to_string(),
            file_data,
            file_name,
            file_type,
        }
    }

    /// Decodes the attached file back into bytes, if any.
    pub fn decode_file(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        self.file_data.as_deref().map(|d| BASE64.decode(d)).transpose()
    }
}

#[derive(Debug, Serialize)]
pub struct CreateDraftResponse {
    pub token: Uuid,
}

/// POST /api/drafts
///
/// Phase 1 of the handoff: validate and park the draft, return the token the
/// client carries through the sign-in redirect.
pub async fn handle_create_draft(
    State(state): State<AppState>,
    payload: Result<Json<DraftSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateDraftResponse>), AppError> {
    let Json(draft) =
        payload.map_err(|e| AppError::Unexpected(format!("Failed to save draft: {e}")))?;

    if !draft.is_valid() {
        return Err(AppError::Validation(
            "Please provide a message or attach a resume file".to_string(),
        ));
    }

    let token = Uuid::new_v4();
    let payload = serde_json::to_value(&draft)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("draft serialization failed: {e}")))?;

    sqlx::query("INSERT INTO drafts (token, payload, created_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(&payload)
        .bind(Utc::now())
        .execute(&state.db)
        .await?;

    info!(%token, "Draft submission parked");
    Ok((StatusCode::CREATED, Json(CreateDraftResponse { token })))
}

/// GET /api/drafts/:token
///
/// Phase 2: the authenticated owner of the token claims the draft. The row
/// is deleted on read, so a draft resumes at most once; expired rows are
/// deleted too but report 404.
pub async fn handle_claim_draft(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(token): Path<Uuid>,
) -> Result<Json<DraftSubmission>, AppError> {
    let row: Option<DraftRow> = sqlx::query_as(
        "DELETE FROM drafts WHERE token = $1 RETURNING token, payload, created_at",
    )
    .bind(token)
    .fetch_optional(&state.db)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound("Draft not found or expired".to_string()))?;

    if row.created_at + Duration::minutes(DRAFT_TTL_MINUTES) <= Utc::now() {
        return Err(AppError::NotFound("Draft not found or expired".to_string()));
    }

    let draft: DraftSubmission = serde_json::from_value(row.payload)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored draft is malformed: {e}")))?;

    info!(%token, user_id = %user.user_id, "Draft submission claimed");
    Ok(Json(draft))
}
