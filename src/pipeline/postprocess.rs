//! Post-processing: normalise the model's text before JSON parsing.
//!
//! Native structured output (Gemini) returns a bare JSON object, but
//! prompt-only providers sometimes disobey and wrap the object in a
//! ```` ```json ```` fence or prefix a BOM. These rules only remove wrapping;
//! the content itself is never touched. The raw text is kept separately so
//! the `.txt` fallback is always the model's exact answer.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules, in order:
/// 1. Strip invisible leading characters (BOM, zero-width spaces)
/// 2. Strip an outer code fence (`json` tag optional)
/// 3. Trim surrounding whitespace
pub fn clean_response(input: &str) -> String {
    let s = strip_invisible_prefix(input);
    let s = strip_code_fence(s);
    s.trim().to_string()
}

// ── Rule 1: Invisible prefix ─────────────────────────────────────────────────

fn strip_invisible_prefix(input: &str) -> &str {
    input.trim_start_matches(['\u{FEFF}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}'])
}

// ── Rule 2: Outer fence ──────────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_code_fence(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => trimmed,
    }
}
