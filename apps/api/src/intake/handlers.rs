use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::agent::classify_failure;
use crate::errors::AppError;
use crate::intake::extract::{extract_text, MediaType};
use crate::models::resume::Resume;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ParseDocumentResponse {
    pub result: Resume,
}

/// POST /api/parse-document
///
/// Multipart upload of a DOCX or PDF resume. Validates the declared media
/// type, extracts raw text, and hands it to the structuring agent. The agent
/// output is returned verbatim under `result`.
pub async fn handle_parse_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseDocumentResponse>, AppError> {
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
            file = Some((content_type, data));
            break;
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let media_type = MediaType::from_mime(&content_type)
        .ok_or_else(|| AppError::Validation("Please upload a DOCX or PDF file".to_string()))?;

    info!(
        media_type = ?media_type,
        bytes = data.len(),
        "Extracting text from uploaded document"
    );

    // PDF/zip crunching is CPU-bound; keep it off the async runtime threads.
    let text = tokio::task::spawn_blocking(move || extract_text(media_type, &data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let result = state
        .agent
        .structure(&text)
        .await
        .map_err(|e| classify_failure("Failed to process resume with AI", e))?;

    info!("Document structured successfully");
    Ok(Json(ParseDocumentResponse { result }))
}
