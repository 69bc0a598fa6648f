/// Generation backend client — the single point of entry for all hosted
/// text-generation calls in the HSM API.
///
/// ARCHITECTURAL RULE: No other module may call the generation backend
/// directly. All generation traffic MUST go through this module.
///
/// The backend exposes one operation: a prompt plus a declared response type
/// (`text` or `json`). Each call is a single attempt — the report pipeline
/// has no retry policy.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const GENERATE_PATH: &str = "/v1/generate";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Response shape requested from the backend. Wire values: `text` / `json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Structured,
}

/// A single backend result, tagged by the kind that was requested — never
/// inferred from the payload itself.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Text(String),
    Structured(Value),
}

impl GenerationOutcome {
    /// The text payload, if this outcome came from a `Text` request.
    pub fn into_text(self) -> Option<String> {
        match self {
            GenerationOutcome::Text(text) => Some(text),
            GenerationOutcome::Structured(_) => None,
        }
    }

    /// The parsed payload, if this outcome came from a `Structured` request.
    pub fn into_structured(self) -> Option<Value> {
        match self {
            GenerationOutcome::Text(_) => None,
            GenerationOutcome::Structured(value) => Some(value),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    response_type: ResponseKind,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorEnvelope {
    error: BackendErrorBody,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: String,
}

/// The single generation client used by the report pipeline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
        }
    }

    /// Makes one call to the generation backend and returns the outcome
    /// tagged with the requested kind.
    ///
    /// For `Text` the payload is passed through with no content validation.
    /// For `Structured` the payload is parsed to a JSON value (stripping
    /// markdown code fences if the backend wraps its JSON in them) — schema
    /// conformance is the caller's concern, not this client's.
    pub async fn generate(
        &self,
        prompt: &str,
        kind: ResponseKind,
    ) -> Result<GenerationOutcome, BackendError> {
        let request_body = GenerateRequest {
            prompt,
            response_type: kind,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<BackendErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateResponse = response.json().await?;
        let result = payload.result.ok_or(BackendError::EmptyContent)?;

        match kind {
            ResponseKind::Text => {
                let text = result
                    .as_str()
                    .ok_or(BackendError::EmptyContent)?
                    .to_string();
                debug!("Generation call succeeded: {} chars of text", text.len());
                Ok(GenerationOutcome::Text(text))
            }
            ResponseKind::Structured => {
                // The backend may return the JSON value directly, or as a
                // string that still needs parsing.
                let value = match result {
                    Value::String(raw) => serde_json::from_str(strip_json_fences(&raw))?,
                    other => other,
                };
                debug!("Generation call succeeded: structured payload");
                Ok(GenerationOutcome::Structured(value))
            }
        }
    }

    /// Convenience method for narrative-style calls.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, BackendError> {
        self.generate(prompt, ResponseKind::Text)
            .await?
            .into_text()
            .ok_or(BackendError::EmptyContent)
    }

    /// Convenience method for structured calls. The prompt must instruct the
    /// backend to return valid JSON.
    pub async fn generate_structured(&self, prompt: &str) -> Result<Value, BackendError> {
        self.generate(prompt, ResponseKind::Structured)
            .await?
            .into_structured()
            .ok_or(BackendError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from backend output.
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
