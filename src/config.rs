//! Configuration types for receipt extraction.
//!
//! All batch behaviour is controlled through [`ExtractionConfig`], built via
//! its [`ExtractionConfigBuilder`]. The defaults reproduce the plain
//! "process every `uctenka_*.*` in the current directory with Gemini" run;
//! every knob exists so the CLI and library callers can move away from it
//! one field at a time.

use crate::backend::ExtractionBackend;
use crate::error::ReceiptError;
use crate::pipeline::discover::DEFAULT_PATTERN;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable holding the Gemini credential.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for a batch extraction.
///
/// # Example
/// ```rust
/// use receipt2json::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .input_dir("scans")
///     .model("gemini-2.0-flash-001")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory searched for receipts. Default: current directory.
    pub input_dir: PathBuf,

    /// Glob matched against file names in `input_dir`. Default: `uctenka_*.*`.
    pub pattern: String,

    /// Where `.json` / `.txt` results go. Default: `None`, next to each input.
    pub output_dir: Option<PathBuf>,

    /// Model identifier. If `None`, uses the provider default
    /// (`gemini-2.0-flash-001` for Gemini).
    pub model: Option<String>,

    /// Provider name (`gemini`, `openai`, `anthropic`, `ollama`, …).
    /// `None` means Gemini.
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over `provider_name`.
    pub backend: Option<Arc<dyn ExtractionBackend>>,

    /// Gemini API key. If `None`, read from `GEMINI_API_KEY`.
    pub api_key: Option<String>,

    /// Override for the Gemini API root (proxies, regional endpoints).
    pub api_base_url: Option<String>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low enough for the model to copy numbers faithfully, with a little
    /// room to resolve smudged digits.
    pub temperature: f32,

    /// Maximum tokens the model may generate per receipt. Default: 2048.
    pub max_tokens: usize,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom instruction. If `None`, uses the built-in receipt prompt.
    pub prompt: Option<String>,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
            output_dir: None,
            model: None,
            provider_name: None,
            backend: None,
            api_key: None,
            api_base_url: None,
            temperature: 0.2,
            max_tokens: 2048,
            api_timeout_secs: 60,
            prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("input_dir", &self.input_dir)
            .field("pattern", &self.pattern)
            .field("output_dir", &self.output_dir)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    /// Use a pre-built backend; skips provider resolution and credential checks.
    pub fn backend(mut self, backend: Arc<dyn ExtractionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = Some(url.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ReceiptError> {
        let c = &self.config;
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(ReceiptError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.pattern.trim().is_empty() {
            return Err(ReceiptError::InvalidConfig(
                "File pattern must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ReceiptError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ReceiptError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_run() {
        let c = ExtractionConfig::default();
        assert_eq!(c.input_dir, PathBuf::from("."));
        assert_eq!(c.pattern, "uctenka_*.*");
        assert!(c.output_dir.is_none());
        assert_eq!(c.temperature, 0.2);
        assert_eq!(c.api_timeout_secs, 60);
    }

    #[test]
    fn builder_sets_fields() {
        let c = ExtractionConfig::builder()
            .input_dir("/tmp/scans")
            .pattern("receipt_*.pdf")
            .output_dir("/tmp/out")
            .model("gemini-2.5-pro")
            .provider_name("gemini")
            .max_tokens(512)
            .build()
            .unwrap();
        assert_eq!(c.input_dir, PathBuf::from("/tmp/scans"));
        assert_eq!(c.pattern, "receipt_*.pdf");
        assert_eq!(c.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(c.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(c.max_tokens, 512);
    }

    #[test]
    fn rejects_bad_temperature() {
        assert!(ExtractionConfig::builder().temperature(2.5).build().is_err());
        assert!(ExtractionConfig::builder().temperature(-0.1).build().is_err());
    }

    #[test]
    fn rejects_empty_pattern_and_zero_timeout() {
        assert!(ExtractionConfig::builder().pattern("  ").build().is_err());
        assert!(ExtractionConfig::builder().api_timeout_secs(0).build().is_err());
        assert!(ExtractionConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ExtractionConfig::builder().api_key("AIza-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("AIza-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
