//! File discovery: expand the receipt glob inside the input directory.
//!
//! The directory part is escaped before it is joined with the pattern so a
//! folder called `scans [2024]` is matched literally rather than as a
//! character class. Results are sorted to give a stable processing order.

use crate::error::ReceiptError;
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default receipt naming convention.
pub const DEFAULT_PATTERN: &str = "uctenka_*.*";

/// List regular files in `dir` whose names match `pattern`.
///
/// Zero matches is not an error; an invalid pattern or a missing directory is.
pub fn discover_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ReceiptError> {
    if !dir.is_dir() {
        return Err(ReceiptError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let full = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()).trim_end_matches('/'),
        pattern
    );
    debug!("Discovering receipts with pattern {}", full);

    let entries = glob(&full).map_err(|e| ReceiptError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    debug!("Discovered {} files", files.len());
    Ok(files)
}

/// Output stem for a receipt: the file name without its last extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt".to_string())
}
