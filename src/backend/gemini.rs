//! Google Gemini backend using the `generateContent` REST endpoint.
//!
//! Gemini accepts PDFs and images inline and enforces a response schema
//! server-side, so the answer is a bare JSON object in the common case.

use super::{ExtractionBackend, ExtractionRequest};
use crate::error::{FileError, ReceiptError};
use crate::pipeline::encode::encode_payload;
use crate::prompts::response_schema;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, warn};

/// Default model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";

/// Public API root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Receipt extraction through Gemini.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiBackend {
    /// Create a backend for `model`. A `models/` prefix is accepted and dropped.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<&str>,
    ) -> Result<Self, ReceiptError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ReceiptError::Internal(format!("HTTP client: {e}")))?;

        let model: String = model.into();
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.trim_start_matches("models/").to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ExtractionBackend for GeminiBackend {
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, FileError> {
        let body = build_request_body(request);
        let request_failed = |detail: String| FileError::RequestFailed {
            path: request.path.to_path_buf(),
            detail,
        };

        debug!("POST {} ({})", self.endpoint(), request.mime_type);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(request_failed(format!("Gemini API error ({status}): {error_text}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| request_failed(format!("unreadable response: {e}")))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "{}: {} input tokens, {} output tokens",
                request.path.display(),
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }

        match response_text(&parsed) {
            Some(text) => Ok(text),
            None => {
                let feedback = describe_empty(&parsed);
                warn!("Gemini returned no text for {}: {}", request.path.display(), feedback);
                Err(FileError::EmptyResponse {
                    path: request.path.to_path_buf(),
                    feedback,
                })
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// JSON body for `generateContent`: instruction, inline payload, and a
/// generation config forcing schema-conformant JSON.
fn build_request_body(request: &ExtractionRequest<'_>) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": request.prompt },
                {
                    "inlineData": {
                        "mimeType": request.mime_type,
                        "data": encode_payload(request.data),
                    }
                }
            ]
        }],
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

// ── Response shape (only the fields we read) ─────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<Value>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Concatenated text of the first candidate's parts, if non-empty.
fn response_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Prompt feedback and finish reason, for logging an empty answer.
fn describe_empty(response: &GenerateContentResponse) -> String {
    let feedback = response
        .prompt_feedback
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let finish_reason = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .unwrap_or("N/A");
    format!("prompt feedback: {feedback}, finish reason: {finish_reason}")
}
