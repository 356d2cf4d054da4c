//! The external-model boundary.
//!
//! Everything the pipeline needs from a language model fits in one call:
//! "here is a receipt, the instruction and the schema; give me text back".
//! [`ExtractionBackend`] is that call. Keeping it this narrow lets the batch
//! driver stay provider-agnostic and lets tests swap in a stub that returns
//! canned answers without touching the network.
//!
//! Two implementations ship with the crate:
//!
//! * [`GeminiBackend`] — direct `generateContent` REST calls with native
//!   structured output (`responseSchema`). The default.
//! * [`LlmProviderBackend`] — any `edgequake_llm::LLMProvider` (OpenAI,
//!   Anthropic, Ollama, …); the schema is rendered into the prompt.

mod gemini;
mod provider;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use provider::LlmProviderBackend;

use crate::error::FileError;
use crate::pipeline::mime;
use async_trait::async_trait;
use std::path::Path;

/// Everything a backend needs to extract one receipt.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Source file, used for error reporting only.
    pub path: &'a Path,
    /// Resolved MIME type of `data`.
    pub mime_type: &'a str,
    /// Raw file bytes.
    pub data: &'a [u8],
    /// Natural-language instruction.
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A model endpoint that turns a receipt into JSON text.
///
/// Implementations return the model's raw text on success. Every failure is
/// a [`FileError`]: the batch logs it and moves on to the next file.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Send the receipt and return the model's raw text.
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, FileError>;

    /// Whether this backend can accept a payload of `mime_type`.
    fn supports_mime_type(&self, mime_type: &str) -> bool {
        mime::is_supported(mime_type)
    }

    /// Short human-readable name for logs.
    fn name(&self) -> &str;
}
