//! Progress-callback trait for per-file extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the batch walks through the matched receipts. The CLI uses it to
//! drive a terminal progress bar; library users can forward the events
//! anywhere.
//!
//! # Example
//!
//! ```rust
//! use receipt2json::{ExtractionConfig, ExtractionProgressCallback, SavedOutput};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, _index: usize, _total: usize, path: &Path, saved: &SavedOutput) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} -> {}", path.display(), saved.path().display());
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { saved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::SavedOutput;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch driver as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after discovery, before the first file is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is read and sent to the model.
    fn on_file_start(&self, index: usize, total_files: usize, path: &Path) {
        let _ = (index, total_files, path);
    }

    /// Called when a result was written, either as JSON or raw text.
    fn on_file_complete(&self, index: usize, total_files: usize, path: &Path, saved: &SavedOutput) {
        let _ = (index, total_files, path, saved);
    }

    /// Called when a file was skipped because of its type.
    fn on_file_skipped(&self, index: usize, total_files: usize, path: &Path, reason: &str) {
        let _ = (index, total_files, path, reason);
    }

    /// Called when reading, extracting or writing a file failed.
    fn on_file_error(&self, index: usize, total_files: usize, path: &Path, error: &str) {
        let _ = (index, total_files, path, error);
    }

    /// Called once after every file has been attempted.
    ///
    /// `extracted` counts files saved as `.json`.
    fn on_batch_complete(&self, total_files: usize, extracted: usize) {
        let _ = (total_files, extracted);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: AtomicUsize,
        errors: AtomicUsize,
        extracted: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_file_start(&self, _index: usize, _total: usize, _path: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _path: &Path, _saved: &SavedOutput) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _index: usize, _total: usize, _path: &Path, _reason: &str) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _path: &Path, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, extracted: usize) {
            self.extracted.store(extracted, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let path = Path::new("uctenka_1.pdf");
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, path);
        cb.on_file_complete(1, 2, path, &SavedOutput::Json("uctenka_1.json".into()));
        cb.on_file_skipped(2, 2, Path::new("uctenka_2.txt"), "text/plain");
        cb.on_file_error(2, 2, path, "boom");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let path = Path::new("uctenka_1.png");

        tracker.on_file_start(1, 3, path);
        tracker.on_file_complete(1, 3, path, &SavedOutput::Json("uctenka_1.json".into()));
        tracker.on_file_start(2, 3, path);
        tracker.on_file_skipped(2, 3, path, "unsupported");
        tracker.on_file_start(3, 3, path);
        tracker.on_file_error(3, 3, path, "HTTP 500");
        tracker.on_batch_complete(3, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.extracted.load(Ordering::SeqCst), 1);
    }
}
