//! Result persistence: `<stem>.json` when the answer parses, `<stem>.txt`
//! with the exact raw text when it does not.
//!
//! Files are written to a temp file in the destination directory and then
//! renamed into place, so an interrupted run never leaves a truncated
//! `.json` that a downstream tool would choke on. A result that already
//! exists keeps its permissions; new results are created `0644` on Unix.
//!
//! Only one of `<stem>.json` and `<stem>.txt` is left after a save: the one
//! from an earlier run with the other outcome is removed.

use crate::error::FileError;
use crate::output::SavedOutput;
use crate::pipeline::discover::file_stem;
use crate::pipeline::postprocess::clean_response;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persist the model's answer for `source` into `out_dir`.
///
/// Returns the parsed JSON alongside the written path so callers can build a
/// typed view without parsing twice. A write failure is returned as
/// [`FileError::WriteFailed`]; a JSON write failure does not fall back to
/// `.txt`.
pub fn save_response(
    raw: &str,
    source: &Path,
    out_dir: &Path,
) -> Result<(SavedOutput, Option<Value>), FileError> {
    let stem = file_stem(source);

    match serde_json::from_str::<Value>(&clean_response(raw)) {
        Ok(value) => {
            let path = out_dir.join(format!("{stem}.json"));
            let pretty = serde_json::to_string_pretty(&value).map_err(|e| FileError::WriteFailed {
                path: path.clone(),
                detail: e.to_string(),
            })?;
            write_atomic(&path, pretty.as_bytes())?;
            remove_stale(&out_dir.join(format!("{stem}.txt")));
            info!("Saved JSON to {}", path.display());
            Ok((SavedOutput::Json(path), Some(value)))
        }
        Err(e) => {
            warn!(
                "Output for {} was not valid JSON ({}). Saving raw output.",
                source.display(),
                e
            );
            let path = out_dir.join(format!("{stem}.txt"));
            write_atomic(&path, raw.as_bytes())?;
            remove_stale(&out_dir.join(format!("{stem}.json")));
            info!("Saved raw output to {}", path.display());
            Ok((SavedOutput::RawText(path), None))
        }
    }
}

/// Write `contents` to `path` via a sibling temp file and rename.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), FileError> {
    let write_failed = |detail: String| FileError::WriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let dir: PathBuf = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| write_failed(e.to_string()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".receipt2json-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|e| write_failed(e.to_string()))?;
    tmp.write_all(contents)
        .map_err(|e| write_failed(e.to_string()))?;
    if let Some(perms) = target_permissions(path) {
        std::fs::set_permissions(tmp.path(), perms).map_err(|e| write_failed(e.to_string()))?;
    }
    tmp.persist(path).map_err(|e| write_failed(e.error.to_string()))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Permissions for a result file: the existing file's, else `0644` on Unix.
fn target_permissions(path: &Path) -> Option<std::fs::Permissions> {
    if let Ok(meta) = std::fs::metadata(path) {
        return Some(meta.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Remove the other-format output left by an earlier run.
fn remove_stale(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed stale {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove stale {}: {}", path.display(), e),
    }
}
