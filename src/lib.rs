//! # pdf2txt
//!
//! Batch-convert a tree of PDF documents to JPEG page images with Ghostscript,
//! then to plain text with Tesseract, mirroring the input directory layout
//! into two output trees.
//!
//! ## Pipeline Overview
//!
//! ```text
//! <input>/a/b.pdf
//!  │
//!  ├─ 1. Rasterize  gs -r<dpi> -sDEVICE=jpeg  →  <jpgdir>/a/b-1.jpg, b-2.jpg, …
//!  └─ 2. OCR        tesseract                 →  <textdir>/a/b-1.txt, b-2.txt, …
//! ```
//!
//! Both engines are external programs; this crate walks directories, maps
//! paths, runs one process at a time and records what happened. Resume mode
//! skips step 1 and every image whose non-empty text output already exists,
//! so an interrupted batch can be restarted cheaply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2txt::{run, BatchConfig, CancellationFlag};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder().dpi(300).build()?;
//!     let report = run("scans", &config, &CancellationFlag::new()).await?;
//!     eprintln!("{} text file(s) written", report.ocr.processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{ocr_tree, rasterize_tree, run, run_sync};
pub use cancel::CancellationFlag;
pub use config::{BatchConfig, BatchConfigBuilder, ExternalTool};
pub use error::{FileError, Pdf2TxtError};
pub use output::{BatchReport, FileOutcome, FileReport, ProcessOutput, Stage, StageStats};
pub use pipeline::ocr::ocr_image;
pub use pipeline::paths::PathMapper;
pub use pipeline::rasterize::rasterize_pdf;
pub use pipeline::scan::FilePattern;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
