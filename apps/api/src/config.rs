use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails fast at startup if required variables are missing.
///
/// The OAuth client pairs are consumed by the hosted identity provider, not
/// by this service directly; they are loaded here so a misconfigured deploy
/// is caught at boot rather than at first sign-in.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub google_ai_api_key: String,
    pub auth_secret: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            google_ai_api_key: require_env("GOOGLE_GENERATIVE_AI_API_KEY")?,
            auth_secret: require_env("AUTH_SECRET")?,
            google_client_id: require_env("GOOGLE_CLIENT_ID")?,
            google_client_secret: require_env("GOOGLE_CLIENT_SECRET")?,
            github_client_id: require_env("GITHUB_CLIENT_ID")?,
            github_client_secret: require_env("GITHUB_CLIENT_SECRET")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
