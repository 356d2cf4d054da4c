//! Payload encoding: raw receipt bytes → base64 for the JSON request body.
//!
//! Both the Gemini `inlineData` part and `edgequake_llm::ImageData` carry the
//! file as standard (padded) base64. The original bytes are sent untouched;
//! no re-encoding or downscaling happens here.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Base64-encode a receipt payload.
pub fn encode_payload(bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), b64.len());
    b64
}

/// Wrap a receipt image as an `ImageData` attachment for an `LLMProvider`.
///
/// `detail: "high"` keeps small print (VAT numbers, rates) legible to
/// tile-based vision models.
pub fn encode_image(bytes: &[u8], mime_type: &str) -> ImageData {
    ImageData::new(encode_payload(bytes), mime_type).with_detail("high")
}
