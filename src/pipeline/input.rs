//! Input reading: load a receipt's bytes from disk.
//!
//! Errors are mapped to [`FileError::ReadFailed`] with a readable detail so
//! one unreadable file is logged and skipped rather than aborting the batch.

use crate::error::FileError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read the whole file into memory.
pub async fn read_receipt(path: &Path) -> Result<Vec<u8>, FileError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        let detail = match e.kind() {
            ErrorKind::NotFound => "file not found".to_string(),
            ErrorKind::PermissionDenied => format!("permission denied (try: chmod +r {path:?})"),
            _ => e.to_string(),
        };
        FileError::ReadFailed {
            path: path.to_path_buf(),
            detail,
        }
    })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}
