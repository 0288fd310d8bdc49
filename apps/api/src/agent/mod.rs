/// Resume Agent — the single point of entry for all AI calls in ResumeCraft.
///
/// ARCHITECTURAL RULE: No other module may call the Google Generative AI API
/// directly. All model interactions MUST go through this module, behind the
/// `ResumeAgent` trait, so callers never know which provider backs it.
///
/// Model: gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::resume::Resume;

pub mod prompts;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all agent calls in ResumeCraft.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Agent returned empty content")]
    EmptyContent,

    #[error("Agent call timed out")]
    Timeout,
}

impl AgentError {
    /// A missing or invalid credential is the one failure operators hit most
    /// often on a fresh deploy. Detected by the known substrings the Google
    /// API (and our own config plumbing) put in the failure message.
    pub fn is_credential_failure(&self) -> bool {
        let message = self.to_string();
        message.contains("API key") || message.contains("GOOGLE_GENERATIVE_AI_API_KEY")
    }
}

/// Maps an agent failure to the HTTP error taxonomy: credential failures get
/// the actionable config message, everything else is wrapped with `context`.
pub fn classify_failure(context: &str, err: AgentError) -> AppError {
    if err.is_credential_failure() {
        AppError::AgentConfig
    } else {
        AppError::Agent(format!("{context}: {err}"))
    }
}

/// Output of a revision call: the revised resume plus the agent's
/// natural-language explanation of what changed.
#[derive(Debug, Clone, Deserialize)]
pub struct Revision {
    pub resume: Resume,
    pub message: String,
}

/// The narrow seam between this service and whichever model provider backs
/// the structuring and revision calls.
#[async_trait]
pub trait ResumeAgent: Send + Sync {
    /// Converts raw extracted document text into a structured resume.
    async fn structure(&self, raw_text: &str) -> Result<Resume, AgentError>;

    /// Produces a revised resume plus explanation from a free-text
    /// instruction and an optional target-job URL.
    async fn revise(
        &self,
        resume: &Resume,
        instruction: &str,
        job_url: &str,
    ) -> Result<Revision, AgentError>;
}

// ───────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    /// Absent entirely when the prompt is safety-blocked; the response then
    /// carries only `promptFeedback`.
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GeminiResponse {
    /// Extracts the text content from the first candidate's first text part.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    error: GeminiApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiApiErrorBody {
    message: String,
}

// ───────────────────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────────────────

/// The production `ResumeAgent`, backed by the Gemini structured-output API.
/// Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct GeminiAgent {
    client: Client,
    api_key: String,
}

impl GeminiAgent {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(55))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn call(&self, prompt: &str, system: &str) -> Result<GeminiResponse, AgentError> {
        let request_body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart { text: system }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!("{GEMINI_API_URL}/{MODEL}:generateContent");
        let mut last_error: Option<AgentError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Agent call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AgentError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Agent API returned {}: {}", status, body);
                last_error = Some(AgentError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Pull out the API's own message when the body parses
                let message = serde_json::from_str::<GeminiApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(AgentError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let gemini_response: GeminiResponse = response.json().await?;

            if let Some(usage) = &gemini_response.usage {
                debug!(
                    "Agent call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(gemini_response);
        }

        Err(last_error.unwrap_or(AgentError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the model and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, AgentError> {
        let response = self.call(prompt, system).await?;

        let text = response.text().ok_or(AgentError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(AgentError::Parse)
    }
}

#[async_trait]
impl ResumeAgent for GeminiAgent {
    async fn structure(&self, raw_text: &str) -> Result<Resume, AgentError> {
        let prompt = prompts::STRUCTURE_PROMPT.replace("{document_text}", raw_text);
        self.call_json::<Resume>(&prompt, prompts::STRUCTURE_SYSTEM)
            .await
    }

    async fn revise(
        &self,
        resume: &Resume,
        instruction: &str,
        job_url: &str,
    ) -> Result<Revision, AgentError> {
        let resume_json = serde_json::to_string(resume)?;
        let prompt = prompts::REVISE_PROMPT
            .replace("{resume_json}", &resume_json)
            .replace("{instruction}", instruction)
            .replace("{job_url}", job_url);
        self.call_json::<Revision>(&prompt, prompts::REVISE_SYSTEM)
            .await
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn api_key_message_is_a_credential_failure() {
        let err = AgentError::Api {
            status: 400,
            message: "API key not valid. Please pass a valid API key.".to_string(),
        };
        assert!(err.is_credential_failure());
    }

    #[test]
    fn env_var_message_is_a_credential_failure() {
        let err = AgentError::Api {
            status: 500,
            message: "GOOGLE_GENERATIVE_AI_API_KEY is empty".to_string(),
        };
        assert!(err.is_credential_failure());
    }

    #[test]
    fn overload_message_is_not_a_credential_failure() {
        let err = AgentError::Api {
            status: 503,
            message: "The model is overloaded. Please try again later.".to_string(),
        };
        assert!(!err.is_credential_failure());
    }

    #[test]
    fn classify_failure_maps_credential_errors_to_config() {
        let err = AgentError::Api {
            status: 400,
            message: "API key not valid".to_string(),
        };
        let app_err = classify_failure("Failed to process resume with AI", err);
        assert!(matches!(app_err, AppError::AgentConfig));
    }

    #[test]
    fn classify_failure_wraps_generic_errors_with_context() {
        let err = AgentError::EmptyContent;
        let app_err = classify_failure("Failed to revamp resume", err);
        match app_err {
            AppError::Agent(msg) => {
                assert!(msg.starts_with("Failed to revamp resume: "));
                assert!(msg.contains("empty content"));
            }
            other => panic!("expected Agent, got {other:?}"),
        }
    }

    #[test]
    fn blocked_response_without_candidates_decodes_to_no_text() {
        // A safety-blocked response has no candidates at all, only feedback.
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn revision_payload_deserializes() {
        let json = r#"{
            "resume": {"summary": "Seasoned engineer", "skills": ["Rust"]},
            "message": "Tightened the summary and reordered skills."
        }"#;
        let revision: Revision = serde_json::from_str(json).unwrap();
        assert_eq!(revision.resume.0["skills"][0], "Rust");
        assert!(revision.message.starts_with("Tightened"));
    }
}
