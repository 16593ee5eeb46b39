//! Pipeline stages for PDF-to-text batch conversion.
//!
//! Each submodule implements one step. The driver in [`crate::batch`] wires
//! them together.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ rasterize ──▶ scan ──▶ ocr
//! (*.pdf)   (gs → jpg)   (*.jpg)  (tesseract → txt)
//! ```
//!
//! 1. [`scan`]      — recursive walk with shell-style file-name patterns
//! 2. [`paths`]     — mirror a source path into an output tree
//! 3. [`process`]   — spawn an external program and capture its output
//! 4. [`rasterize`] — one PDF to numbered JPEG pages
//! 5. [`ocr`]       — one JPEG to a text file, with resume skipping

pub mod ocr;
pub mod paths;
pub mod process;
pub mod rasterize;
pub mod scan;
