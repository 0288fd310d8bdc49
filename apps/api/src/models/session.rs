use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A row in the `sessions` table, written by the hosted identity provider.
/// This service only ever reads it to resolve a token to a user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRow {
    pub session_token: String,
    pub user_id: Uuid,
    pub expires: DateTime<Utc>,
}

/// A pending draft submission parked while the user signs in.
/// Written once in phase 1 of the handoff, consumed once in phase 2.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DraftRow {
    pub token: Uuid,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}
