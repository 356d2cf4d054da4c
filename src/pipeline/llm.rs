//! Extraction request: hand one receipt to the configured backend.
//!
//! This stage owns the per-call policy that is independent of the provider:
//! which instruction to send, the sampling settings, and the timeout. There
//! is deliberately no retry; a failed call skips the file.

use crate::backend::{ExtractionBackend, ExtractionRequest};
use crate::config::ExtractionConfig;
use crate::error::FileError;
use crate::prompts::DEFAULT_EXTRACTION_PROMPT;
use std::path::Path;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// Send `data` to the backend and return the model's raw text.
pub async fn request_extraction(
    backend: &dyn ExtractionBackend,
    path: &Path,
    mime_type: &str,
    data: &[u8],
    config: &ExtractionConfig,
) -> Result<String, FileError> {
    let start = Instant::now();
    let request = ExtractionRequest {
        path,
        mime_type,
        data,
        prompt: config.prompt.as_deref().unwrap_or(DEFAULT_EXTRACTION_PROMPT),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let result = match timeout(
        Duration::from_secs(config.api_timeout_secs),
        backend.extract(&request),
    )
    .await
    {
        Ok(inner) => inner,
        Err(_) => Err(FileError::Timeout {
            path: path.to_path_buf(),
            secs: config.api_timeout_secs,
        }),
    };

    match &result {
        Ok(text) => debug!(
            "{}: {} returned {} chars in {:?}",
            path.display(),
            backend.name(),
            text.len(),
            start.elapsed()
        ),
        Err(e) => debug!("{}: {} failed: {}", path.display(), backend.name(), e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<(String, f32, String)>>,
    }

    #[async_trait]
    impl ExtractionBackend for Recording {
        async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, FileError> {
            self.seen.lock().unwrap().push((
                request.mime_type.to_string(),
                request.temperature,
                request.prompt.to_string(),
            ));
            Ok("{}".to_string())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct Slow;

    #[async_trait]
    impl ExtractionBackend for Slow {
        async fn extract(&self, _request: &ExtractionRequest<'_>) -> Result<String, FileError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("{}".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn sends_default_prompt_and_temperature() {
        let backend = Recording {
            seen: Mutex::new(Vec::new()),
        };
        let config = ExtractionConfig::default();

        let text = request_extraction(&backend, Path::new("uctenka_1.png"), "image/png", b"x", &config)
            .await
            .unwrap();
        assert_eq!(text, "{}");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].0, "image/png");
        assert_eq!(seen[0].1, 0.2);
        assert_eq!(seen[0].2, DEFAULT_EXTRACTION_PROMPT);
    }

    #[tokio::test]
    async fn prompt_override_is_used() {
        let backend = Recording {
            seen: Mutex::new(Vec::new()),
        };
        let config = ExtractionConfig::builder().prompt("Only the total.").build().unwrap();

        request_extraction(&backend, Path::new("uctenka_1.png"), "image/png", b"x", &config)
            .await
            .unwrap();
        assert_eq!(backend.seen.lock().unwrap()[0].2, "Only the total.");
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let config = ExtractionConfig::builder().api_timeout_secs(1).build().unwrap();

        let err = request_extraction(&Slow, Path::new("uctenka_1.pdf"), "application/pdf", b"x", &config)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FileError::Timeout {
                path: "uctenka_1.pdf".into(),
                secs: 1
            }
        );
    }
}
