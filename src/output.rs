//! Result types produced by a batch run.
//!
//! Everything here is plain data and serialisable, so the CLI can emit the
//! whole [`BatchReport`] as JSON with `--json`.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The two pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// PDF → JPEG pages.
    Rasterize,
    /// JPEG → text.
    Ocr,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Rasterize => f.write_str("rasterize"),
            Stage::Ocr => f.write_str("ocr"),
        }
    }
}

/// Captured result of one external invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
    /// Wall-clock time from spawn to exit.
    pub duration_ms: u64,
}

/// What happened to one file task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The external program ran to completion (successfully or not).
    Completed(ProcessOutput),
    /// No invocation was needed.
    Skipped { reason: String },
    /// The invocation could not be carried out.
    Failed(FileError),
}

impl FileOutcome {
    /// True when the program ran and exited successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Completed(out) if out.success)
    }

    /// True for launch failures and for non-zero exits.
    pub fn is_failure(&self) -> bool {
        match self {
            FileOutcome::Completed(out) => !out.success,
            FileOutcome::Skipped { .. } => false,
            FileOutcome::Failed(_) => true,
        }
    }
}

/// Record of one processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub stage: Stage,
    /// The PDF or image that was processed.
    pub source: PathBuf,
    /// The rasterizer output pattern (`…-%d.jpg`) or the OCR text file (`….txt`).
    pub destination: PathBuf,
    pub outcome: FileOutcome,
    /// Page images found after rasterization, ordered by page number.
    /// Always empty for the OCR stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PathBuf>,
}

/// Counters for one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    /// Files matched by the stage's walk.
    pub discovered: usize,
    /// Invocations that exited successfully.
    pub processed: usize,
    /// Files skipped in resume mode.
    pub skipped: usize,
    /// Launch failures plus non-zero exits.
    pub failed: usize,
    pub duration_ms: u64,
}

impl StageStats {
    pub(crate) fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Skipped { .. } => self.skipped += 1,
            o if o.is_success() => self.processed += 1,
            _ => self.failed += 1,
        }
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// `None` when rasterization was skipped (resume mode).
    pub rasterize: Option<StageStats>,
    pub ocr: StageStats,
    pub files: Vec<FileReport>,
    pub total_duration_ms: u64,
}

impl BatchReport {
    /// Failed files across both stages.
    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_failure())
    }
}
