//! Error types for the pdf2txt library.
//!
//! Two error types reflect two failure modes:
//!
//! * [`Pdf2TxtError`] — **Fatal**: the batch cannot proceed (invalid
//!   configuration, interrupted by the user). Returned as
//!   `Err(Pdf2TxtError)` from [`crate::batch::run`].
//!
//! * [`FileError`] — **Non-fatal**: one external invocation could not be
//!   carried out (executable missing, timeout, output directory not
//!   creatable). Stored in [`crate::output::FileOutcome::Failed`]; the stage
//!   moves on to the next file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2txt library.
#[derive(Debug, Error)]
pub enum Pdf2TxtError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Run control ───────────────────────────────────────────────────────
    /// The cancellation flag was raised between two file tasks.
    #[error("Interrupted after {completed} file(s)")]
    Interrupted { completed: usize },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file task.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FileError {
    /// The external program could not be found.
    #[error("'{program}' not found (is it installed and on PATH?)")]
    ToolNotFound { program: String },

    /// The external program exists but could not be started.
    #[error("Failed to launch '{program}': {detail}")]
    LaunchFailed { program: String, detail: String },

    /// The external program ran longer than the configured timeout and was killed.
    #[error("'{program}' timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    /// The mirrored output directory could not be created.
    #[error("Cannot create output directory '{path}': {detail}")]
    OutputDir { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let e = Pdf2TxtError::InvalidConfig("DPI must be at least 1".into());
        assert_eq!(e.to_string(), "Invalid configuration: DPI must be at least 1");
    }

    #[test]
    fn interrupted_display() {
        let e = Pdf2TxtError::Interrupted { completed: 7 };
        assert!(e.to_string().contains("7 file(s)"), "got: {e}");
    }

    #[test]
    fn tool_not_found_display() {
        let e = FileError::ToolNotFound {
            program: "gs".into(),
        };
        assert!(e.to_string().contains("'gs' not found"));
    }

    #[test]
    fn timeout_display() {
        let e = FileError::Timeout {
            program: "tesseract".into(),
            secs: 30,
        };
        let msg = e.to_string();
        assert!(msg.contains("tesseract"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn file_error_serialises() {
        let e = FileError::OutputDir {
            path: PathBuf::from("text/a"),
            detail: "read-only file system".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("OutputDir"));
        let back: FileError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
