//! Batch entry points.
//!
//! [`extract_batch`] resolves the backend, discovers the receipts and walks
//! them one at a time: resolve type → read → call model → persist. A file
//! that fails at any step is recorded in its [`FileResult`] and the loop
//! moves on; only configuration problems abort the run, and they abort it
//! before the first file is touched.

use crate::backend::{ExtractionBackend, GeminiBackend, LlmProviderBackend, DEFAULT_GEMINI_MODEL};
use crate::config::{ExtractionConfig, GEMINI_API_KEY_ENV};
use crate::error::{FileError, ReceiptError, PLACEHOLDER_API_KEY};
use crate::output::{BatchOutput, BatchStats, FileResult, Receipt};
use crate::pipeline::{discover, input, llm, mime, persist};
use edgequake_llm::ProviderFactory;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Extract every receipt matching the configured pattern.
///
/// # Returns
/// `Ok(BatchOutput)` whenever the batch could start, even if every file was
/// skipped or failed (check `output.stats`). Zero matching files is a
/// successful, empty batch.
///
/// # Errors
/// Returns `Err(ReceiptError)` only for fatal problems, all detected before
/// any file is processed:
/// - Missing or placeholder API key
/// - Provider could not be configured
/// - Invalid pattern or missing input directory
pub async fn extract_batch(config: &ExtractionConfig) -> Result<BatchOutput, ReceiptError> {
    let total_start = Instant::now();

    // ── Step 1: Backend (credential check happens here) ──────────────────
    let backend = resolve_backend(config)?;
    info!("Using backend: {}", backend.name());

    // ── Step 2: Discover receipts ────────────────────────────────────────
    let paths = discover::discover_files(&config.input_dir, &config.pattern)?;
    if paths.is_empty() {
        warn!(
            "No files found matching '{}' in {}",
            config.pattern,
            config.input_dir.display()
        );
        return Ok(BatchOutput::default());
    }
    info!("Found {} files to process", paths.len());

    let total = paths.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 3: One file at a time ───────────────────────────────────────
    let mut files = Vec::with_capacity(total);
    for (i, path) in paths.into_iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, &path);
        }

        let result = extract_file(backend.as_ref(), &path, config).await;

        if let Some(ref cb) = config.progress_callback {
            match (&result.saved, &result.error) {
                (Some(saved), _) => cb.on_file_complete(index, total, &path, saved),
                (None, Some(e)) if e.is_skip() => {
                    cb.on_file_skipped(index, total, &path, &e.to_string())
                }
                (None, Some(e)) => cb.on_file_error(index, total, &path, &e.to_string()),
                (None, None) => {}
            }
        }
        files.push(result);
    }

    // ── Step 4: Report ───────────────────────────────────────────────────
    let stats = BatchStats::from_results(&files, total_start.elapsed().as_millis() as u64);
    info!(
        "Processing complete: {} JSON, {} raw, {} skipped, {} failed in {}ms",
        stats.extracted, stats.raw_fallbacks, stats.skipped, stats.failed, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.extracted);
    }

    Ok(BatchOutput { files, stats })
}

/// Synchronous wrapper around [`extract_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_batch_sync(config: &ExtractionConfig) -> Result<BatchOutput, ReceiptError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReceiptError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_batch(config))
}

/// Process a single receipt with an already-resolved backend.
///
/// Never fails: skips and errors are stored in [`FileResult::error`].
pub async fn extract_file(
    backend: &dyn ExtractionBackend,
    path: &Path,
    config: &ExtractionConfig,
) -> FileResult {
    let start = Instant::now();
    let mut result = FileResult::new(path.to_path_buf());

    if let Err(e) = run_file(backend, path, config, &mut result).await {
        if e.is_skip() {
            warn!("{}. Skipping.", e);
        } else {
            error!("{}", e);
        }
        result.error = Some(e);
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    result
}

async fn run_file(
    backend: &dyn ExtractionBackend,
    path: &Path,
    config: &ExtractionConfig,
    result: &mut FileResult,
) -> Result<(), FileError> {
    let mime_type = mime::resolve_mime_type(path).ok_or_else(|| FileError::UnknownMimeType {
        path: path.to_path_buf(),
    })?;
    result.mime_type = Some(mime_type.clone());

    if !mime::is_supported(&mime_type) || !backend.supports_mime_type(&mime_type) {
        return Err(FileError::UnsupportedType {
            path: path.to_path_buf(),
            mime_type,
        });
    }

    info!("Processing file: {} (MIME type: {})", path.display(), mime_type);

    let data = input::read_receipt(path).await?;
    let raw = llm::request_extraction(backend, path, &mime_type, &data, config).await?;
    debug!("Extracted text for {}:\n{}", path.display(), raw);

    let out_dir = output_dir_for(path, config);
    let saved = persist::save_response(&raw, path, &out_dir);
    result.raw_response = Some(raw);
    let (saved, value) = saved?;

    result.receipt = value.and_then(|v| serde_json::from_value::<Receipt>(v).ok());
    result.saved = Some(saved);
    Ok(())
}

/// `config.output_dir`, or the directory containing `path`.
fn output_dir_for(path: &Path, config: &ExtractionConfig) -> PathBuf {
    if let Some(ref dir) = config.output_dir {
        return dir.clone();
    }
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ── Backend resolution ───────────────────────────────────────────────────

/// Resolve the extraction backend, from most-specific to least-specific.
///
/// 1. **Pre-built backend** (`config.backend`) — used as-is. Tests and
///    callers with custom middleware go through here.
/// 2. **Named provider** (`config.provider_name`, anything but `gemini`) —
///    built through [`ProviderFactory::create_llm_provider`], which reads
///    the provider's own API key variable.
/// 3. **Gemini** — the default. The key comes from `config.api_key`, else
///    `GEMINI_API_KEY`. A missing, empty or placeholder key is fatal.
pub fn resolve_backend(config: &ExtractionConfig) -> Result<Arc<dyn ExtractionBackend>, ReceiptError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    let provider = config
        .provider_name
        .as_deref()
        .map(|p| p.trim().to_lowercase())
        .unwrap_or_else(|| "gemini".to_string());

    if !is_gemini(&provider) {
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| default_vision_model_for_provider(&provider).to_string());
        let llm = ProviderFactory::create_llm_provider(&provider, &model).map_err(|e| {
            ReceiptError::ProviderNotConfigured {
                provider: provider.clone(),
                hint: format!("{e}"),
            }
        })?;
        return Ok(Arc::new(LlmProviderBackend::new(llm, format!("{provider}/{model}"))));
    }

    let api_key = usable_credential(
        config.api_key.as_deref(),
        std::env::var(GEMINI_API_KEY_ENV).ok(),
    )
    .ok_or_else(|| {
        error!("No usable Gemini API key; nothing will be processed");
        ReceiptError::MissingCredential {
            provider: "gemini".to_string(),
            env_var: GEMINI_API_KEY_ENV.to_string(),
        }
    })?;

    let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
    let backend = GeminiBackend::new(api_key, model, config.api_base_url.as_deref())?;
    Ok(Arc::new(backend))
}

fn is_gemini(provider: &str) -> bool {
    matches!(provider, "gemini" | "google")
}

/// Pick the explicit key if given, else the environment one; reject blanks
/// and the placeholder. An explicit key is never silently replaced by the
/// environment.
fn usable_credential(explicit: Option<&str>, env: Option<String>) -> Option<String> {
    let candidate = match explicit {
        Some(k) => k.trim().to_string(),
        None => env?.trim().to_string(),
    };
    if candidate.is_empty() || candidate == PLACEHOLDER_API_KEY {
        None
    } else {
        Some(candidate)
    }
}

/// Vision-capable default model per `edgequake_llm` provider.
fn default_vision_model_for_provider(provider: &str) -> &'static str {
    match provider {
        "openai" | "azure" => "gpt-4.1-mini",
        "anthropic" => "claude-sonnet-4-20250514",
        "mistral" => "pixtral-12b-2409",
        "ollama" | "lmstudio" => "llava",
        _ => "gpt-4.1-mini",
    }
}
