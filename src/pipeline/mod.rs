//! Pipeline stages for receipt extraction.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the batch driver in [`crate::extract`] only wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ mime ──▶ input ──▶ llm ──▶ persist
//!  (glob)     (type)   (bytes)  (model)  (.json / .txt)
//! ```
//!
//! 1. [`discover`]    — expand the receipt glob in the input directory
//! 2. [`mime`]        — guess the content type; skip non-image, non-PDF files
//! 3. [`input`]       — read the file bytes
//! 4. [`encode`]      — base64-wrap the payload for the request body
//! 5. [`llm`]         — one call to the configured backend, with timeout;
//!    the only stage with network I/O
//! 6. [`postprocess`] — strip fences/BOM the model may add around the JSON
//! 7. [`persist`]     — write pretty JSON, or the raw text as a fallback

pub mod discover;
pub mod encode;
pub mod input;
pub mod llm;
pub mod mime;
pub mod persist;
pub mod postprocess;
