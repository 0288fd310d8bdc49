pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::drafts;
use crate::intake;
use crate::revision;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Intake: upload → extract → structure
        .route(
            "/api/parse-document",
            post(intake::handlers::handle_parse_document),
        )
        // Revision round-trip
        .route("/api/revamp", post(revision::handlers::handle_revamp))
        // Pre-auth draft handoff
        .route("/api/drafts", post(drafts::handle_create_draft))
        .route("/api/drafts/:token", get(drafts::handle_claim_draft))
        // Session read-side
        .route("/api/session", get(auth::handle_session))
        .with_state(state)
}
