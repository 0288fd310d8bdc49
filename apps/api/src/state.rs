use std::sync::Arc;

use sqlx::PgPool;

use crate::agent::ResumeAgent;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Process-scoped connection pool, created once at startup.
    pub db: PgPool,
    /// The structuring/revision agent behind its provider-agnostic seam.
    pub agent: Arc<dyn ResumeAgent>,
    /// Deploy-time configuration. The auth secret and OAuth pairs are held
    /// for the identity provider; handlers read none of them directly.
    #[allow(dead_code)]
    pub config: Config,
}
