//! # receipt2json
//!
//! Extract company name, VAT number, amounts and date of sale from receipt
//! images and PDFs using multimodal language models, one `.json` per receipt.
//!
//! ## Why this crate?
//!
//! Receipts come in every layout imaginable: thermal-paper photos, scanned
//! invoices, e-shop PDFs. Template- or regex-based parsers break on the first
//! unfamiliar shop. Instead this crate hands the original file to a vision
//! model together with a strict response schema and keeps whatever structured
//! answer comes back.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uctenka_*.*
//!  │
//!  ├─ 1. Discover  glob the input directory
//!  ├─ 2. MIME      guess the type; skip anything that is not an image or PDF
//!  ├─ 3. Read      load the bytes
//!  ├─ 4. Extract   one model call: instruction + file + schema, temperature 0.2
//!  └─ 5. Persist   <name>.json, or <name>.txt with the raw answer
//! ```
//!
//! Files are processed sequentially. A file that fails is logged and
//! skipped; only configuration errors (e.g. no API key) stop the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use receipt2json::{extract_batch, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Gemini key read from GEMINI_API_KEY
//!     let config = ExtractionConfig::default();
//!     let output = extract_batch(&config).await?;
//!     eprintln!(
//!         "{} saved as JSON, {} raw, {} skipped, {} failed",
//!         output.stats.extracted,
//!         output.stats.raw_fallbacks,
//!         output.stats.skipped,
//!         output.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `receipt2json` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Providers
//!
//! | Provider | Payloads | Structured output |
//! |----------|----------|-------------------|
//! | `gemini` (default) | images, PDF | native `responseSchema` |
//! | `openai`, `anthropic`, `mistral`, `ollama`, … via `edgequake-llm` | images | schema in prompt |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{ExtractionBackend, ExtractionRequest, GeminiBackend, LlmProviderBackend};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{FileError, ReceiptError};
pub use extract::{extract_batch, extract_batch_sync, extract_file, resolve_backend};
pub use output::{BatchOutput, BatchStats, FileOutcome, FileResult, Receipt, SavedOutput};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
