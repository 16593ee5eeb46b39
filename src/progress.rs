//! Progress-callback trait for per-stage and per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the driver walks each stage. The CLI uses it to drive a progress bar
//! and echo external tool output; library callers can forward events to a
//! channel, a log file, or a database.
//!
//! # Example
//!
//! ```rust
//! use pdf2txt::{BatchConfig, BatchProgressCallback, FileReport};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, report: &FileReport) {
//!         let n = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{n}: {}", report.source.display());
//!     }
//! }
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{FileReport, Stage, StageStats};
use std::path::Path;
use std::sync::Arc;

/// Called by the driver as it processes each stage and file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed one at a time, so events for a
/// stage arrive strictly in order.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once per stage after the walk, before the first file.
    fn on_stage_start(&self, stage: Stage, total_files: usize) {
        let _ = (stage, total_files);
    }

    /// Called just before a file task starts.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position within the stage
    /// * `total` — files discovered for the stage
    fn on_file_start(&self, stage: Stage, index: usize, total: usize, path: &Path) {
        let _ = (stage, index, total, path);
    }

    /// Called when a file task finishes, whatever its outcome.
    fn on_file_complete(&self, report: &FileReport) {
        let _ = report;
    }

    /// Called once per stage after the last file.
    fn on_stage_complete(&self, stage: Stage, stats: &StageStats) {
        let _ = (stage, stats);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
