//! Error types for the receipt2json library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReceiptError`] — **Fatal**: the batch cannot start at all (missing
//!   credential, provider not configured, bad glob pattern). Returned as
//!   `Err(ReceiptError)` from the top-level `extract*` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single receipt was skipped or failed
//!   (unsupported type, unreadable file, API error, write error) but the rest
//!   of the batch carries on. Stored inside [`crate::output::FileResult`].

use std::path::PathBuf;
use thiserror::Error;

/// Placeholder credential shipped in sample configs; treated as "not set".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// All fatal errors returned by the receipt2json library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ReceiptError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No usable API key: unset, empty, or still the placeholder value.
    #[error(
        "No API key configured for provider '{provider}'.\n\
Set {env_var}=<your key> or pass --api-key."
    )]
    MissingCredential { provider: String, env_var: String },

    /// The named provider could not be instantiated.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Discovery errors ──────────────────────────────────────────────────
    /// The glob pattern could not be compiled.
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The input directory does not exist or is not a directory.
    #[error("Input directory not found: '{path}'")]
    DirectoryNotFound { path: PathBuf },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input file.
///
/// The batch continues after any of these; the variant tells the caller
/// whether the file was skipped on purpose or failed along the way.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// No MIME type could be guessed from the extension.
    #[error("Could not determine MIME type for '{path}'")]
    UnknownMimeType { path: PathBuf },

    /// The MIME type is known but neither an image nor a PDF, or the
    /// active backend cannot accept it.
    #[error("Unsupported file type '{mime_type}' for '{path}' (supported: images, PDF)")]
    UnsupportedType { path: PathBuf, mime_type: String },

    /// The file could not be read from disk.
    #[error("Error reading '{path}': {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The model answered without any text.
    #[error("Model returned an empty response for '{path}' (feedback: {feedback})")]
    EmptyResponse { path: PathBuf, feedback: String },

    /// Transport or API error while calling the model.
    #[error("Request for '{path}' failed: {detail}")]
    RequestFailed { path: PathBuf, detail: String },

    /// The model call exceeded the configured timeout.
    #[error("Request for '{path}' timed out after {secs}s")]
    Timeout { path: PathBuf, secs: u64 },

    /// The extracted result could not be written.
    #[error("Failed to write '{path}': {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}

impl FileError {
    /// `true` for the deliberate no-op skips (unknown or unsupported type).
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            FileError::UnknownMimeType { .. } | FileError::UnsupportedType { .. }
        )
    }
}
