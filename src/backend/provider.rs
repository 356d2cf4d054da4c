//! Backend over any `edgequake_llm` vision provider.
//!
//! Providers reached through `edgequake_llm` do not share a structured-output
//! switch, so the schema travels inside the system prompt and the answer is
//! cleaned of stray fences later by the persister. Only image payloads are
//! accepted: the chat APIs behind `LLMProvider` take images, not PDFs.

use super::{ExtractionBackend, ExtractionRequest};
use crate::error::FileError;
use crate::pipeline::encode::encode_image;
use crate::prompts::schema_instruction;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Receipt extraction through a pre-built `LLMProvider`.
pub struct LlmProviderBackend {
    provider: Arc<dyn LLMProvider>,
    label: String,
}

impl fmt::Debug for LlmProviderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmProviderBackend")
            .field("label", &self.label)
            .field("provider", &"<dyn LLMProvider>")
            .finish()
    }
}

impl LlmProviderBackend {
    /// Wrap `provider`; `label` is used in logs (e.g. `"openai/gpt-4.1-mini"`).
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
        }
    }
}

#[async_trait]
impl ExtractionBackend for LlmProviderBackend {
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, FileError> {
        let messages = vec![
            ChatMessage::system(schema_instruction(request.prompt)),
            ChatMessage::user_with_images("", vec![encode_image(request.data, request.mime_type)]),
        ];
        let options = build_options(request);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| FileError::RequestFailed {
                path: request.path.to_path_buf(),
                detail: format!("{}: {}", self.label, e),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            request.path.display(),
            response.prompt_tokens,
            response.completion_tokens
        );

        if response.content.trim().is_empty() {
            return Err(FileError::EmptyResponse {
                path: request.path.to_path_buf(),
                feedback: "N/A".to_string(),
            });
        }
        Ok(response.content)
    }

    fn supports_mime_type(&self, mime_type: &str) -> bool {
        mime_type.starts_with("image/")
    }

    fn name(&self) -> &str {
        &self.label
    }
}

fn build_options(request: &ExtractionRequest<'_>) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        ..CompletionOptions::json_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn build_options_carries_sampling_settings() {
        let req = ExtractionRequest {
            path: Path::new("uctenka_1.png"),
            mime_type: "image/png",
            data: &[],
            prompt: "Extract.",
            temperature: 0.2,
            max_tokens: 1024,
        };
        let opts = build_options(&req);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(1024));
        assert_eq!(opts.response_format.as_deref(), Some("json_object"));
    }
}
