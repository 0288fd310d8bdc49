//! Session guard.
//!
//! Sessions are written by the hosted identity provider into the `sessions`
//! table; this service only reads them. `CurrentUser` is the capability
//! check at the boundary: handlers that take it as an extractor get an
//! authenticated user id or a 401, and stay ignorant of the auth mechanism.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::SessionRow;
use crate::state::AppState;

/// Name of the session cookie the identity provider sets.
pub const SESSION_COOKIE: &str = "session-token";

/// Authenticated user resolved from a DB-backed session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        let session: Option<SessionRow> = sqlx::query_as(
            "SELECT session_token, user_id, expires FROM sessions WHERE session_token = $1",
        )
        .bind(&token)
        .fetch_optional(&state.db)
        .await?;

        let session = session.ok_or(AppError::Unauthorized)?;
        if session.expires <= Utc::now() {
            return Err(AppError::Unauthorized);
        }

        Ok(CurrentUser {
            user_id: session.user_id,
        })
    }
}

/// Pulls the session token out of the request: `Authorization: Bearer` wins,
/// then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = headers.get(COOKIE).and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// GET /api/session
///
/// Returns the identity behind the caller's session token.
pub async fn handle_session(user: CurrentUser) -> Json<Value> {
    Json(json!({
        "user": { "id": user.user_id }
    }))
}
