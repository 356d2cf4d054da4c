//! CLI binary for receipt2json.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use receipt2json::{
    extract_batch, BatchOutput, ExtractionConfig, ExtractionProgressCallback, FileOutcome,
    ProgressCallback, ReceiptError, SavedOutput,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} receipts  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.enable_steady_tick(Duration::from_millis(80));
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} files to process…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(file_name(path));
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path, saved: &SavedOutput) {
        let (mark, note) = match saved {
            SavedOutput::Json(_) => (green("✓"), String::new()),
            SavedOutput::RawText(_) => (yellow("⚠"), yellow("  not valid JSON, raw text saved")),
        };
        self.bar.println(format!(
            "  {mark} {index:>3}/{total:<3}  {}  →  {}{note}",
            file_name(path),
            dim(&saved.path().display().to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, index: usize, total: usize, path: &Path, reason: &str) {
        self.bar.println(format!(
            "  {} {index:>3}/{total:<3}  {}  {}",
            dim("–"),
            file_name(path),
            dim(reason),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        // Truncate very long API error bodies to keep output tidy.
        let msg: String = if error.chars().count() > 100 {
            let mut s: String = error.chars().take(99).collect();
            s.push('\u{2026}');
            s
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {index:>3}/{total:<3}  {}  {}",
            red("✗"),
            file_name(path),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _extracted: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process every uctenka_*.* in the current directory (Gemini)
  export GEMINI_API_KEY=...
  receipt2json

  # Another folder, results collected elsewhere
  receipt2json --dir ~/scans --output-dir ~/receipts-json

  # Different naming convention
  receipt2json --pattern 'receipt_*.pdf'

  # Use an OpenAI vision model (images only)
  receipt2json --provider openai --model gpt-4.1-mini

  # Machine-readable batch report
  receipt2json --json > report.json

OUTPUT:
  For every input <name>.<ext> one of:
    <name>.json   the model's answer, pretty-printed
    <name>.txt    the raw answer when it was not valid JSON

EXTRACTED FIELDS:
  companyName, vatNumber, priceWithoutVAT, vat, vatRate,
  priceIncludingVAT, dateOfSale (dd.mm.yyyy)

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY              Google Gemini API key (default provider)
  OPENAI_API_KEY, ANTHROPIC_API_KEY, …
                              Keys for --provider other than gemini
  RECEIPT2JSON_MODEL          Override model ID
  RECEIPT2JSON_PROVIDER       Override provider
  RUST_LOG                    Override log filter
"#;

/// Extract receipt data to JSON using multimodal LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "receipt2json",
    version,
    about = "Extract company, VAT and totals from receipt images and PDFs to JSON",
    long_about = "Extract company name, VAT number, amounts and date of sale from receipt \
images and PDFs using multimodal language models. Every matching file gets a <name>.json \
next to it (or <name>.txt with the raw answer if the model did not return valid JSON).",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory to search for receipts.
    #[arg(short, long, env = "RECEIPT2JSON_DIR", default_value = ".")]
    dir: PathBuf,

    /// File-name glob for receipts.
    #[arg(short, long, env = "RECEIPT2JSON_PATTERN", default_value = "uctenka_*.*")]
    pattern: String,

    /// Write results here instead of next to each input.
    #[arg(short, long, env = "RECEIPT2JSON_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Model ID (default: gemini-2.0-flash-001).
    #[arg(long, env = "RECEIPT2JSON_MODEL")]
    model: Option<String>,

    /// Provider: gemini (default), openai, anthropic, mistral, ollama, …
    #[arg(long, env = "RECEIPT2JSON_PROVIDER")]
    provider: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the Gemini API root URL.
    #[arg(long, env = "RECEIPT2JSON_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "RECEIPT2JSON_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max output tokens per receipt.
    #[arg(long, env = "RECEIPT2JSON_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Per-receipt API timeout in seconds.
    #[arg(long, env = "RECEIPT2JSON_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Path to a text file with a custom extraction instruction.
    #[arg(long, env = "RECEIPT2JSON_PROMPT")]
    prompt: Option<PathBuf>,

    /// Print the batch report as JSON instead of the extracted answers.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "RECEIPT2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RECEIPT2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RECEIPT2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries the per-file feedback; library INFO logs
    // would only fight with it for the terminal.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run batch ────────────────────────────────────────────────────────
    let output = match extract_batch(&config).await {
        Ok(output) => output,
        Err(e @ ReceiptError::MissingCredential { .. }) => {
            eprintln!("{} {}", red("CRITICAL:"), e);
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("Extraction failed"),
    };

    if output.files.is_empty() {
        if !cli.quiet {
            eprintln!(
                "No files found matching '{}' in {}.",
                cli.pattern,
                cli.dir.display()
            );
            eprintln!("Please add some files like 'uctenka_001.pdf' or 'uctenka_shop.jpg'.");
        }
        if cli.json {
            print_report(&output)?;
        }
        return Ok(());
    }

    if cli.json {
        print_report(&output)?;
    } else if !cli.quiet {
        print_answers(&output);
    }

    if !cli.quiet {
        let s = &output.stats;
        eprintln!(
            "{}  {} JSON  {} raw  {} skipped  {} failed  —  {}ms",
            if s.failed == 0 && s.raw_fallbacks == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            bold(&s.extracted.to_string()),
            s.raw_fallbacks,
            s.skipped,
            if s.failed > 0 {
                red(&s.failed.to_string())
            } else {
                s.failed.to_string()
            },
            s.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .input_dir(&cli.dir)
        .pattern(&cli.pattern)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print each model answer to stdout, as extracted.
fn print_answers(output: &BatchOutput) {
    for file in &output.files {
        let Some(ref raw) = file.raw_response else {
            continue;
        };
        let label = match file.outcome() {
            FileOutcome::Extracted => "Extracted JSON for",
            _ => "Raw output for",
        };
        println!("{} {}:", label, file_name(&file.path));
        println!("{}", raw.trim_end());
    }
}

fn print_report(output: &BatchOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to serialise report")?;
    println!("{json}");
    Ok(())
}
