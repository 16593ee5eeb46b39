//! OCR stage: one JPEG page → one text file via Tesseract.
//!
//! Tesseract takes an output *base name* and appends `.txt` itself, so the
//! destination handed to it is the extension-less stem.

use crate::config::BatchConfig;
use crate::output::{FileOutcome, FileReport, Stage};
use crate::pipeline::paths::{ensure_parent_dir, text_file_for, PathMapper};
use crate::pipeline::process::run_tool;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Reported for images whose text output already exists in resume mode.
pub const RESUME_SKIP_REASON: &str = "Resume, file exists, skipped";

/// Mapper from the image tree into `config.text_dir`, dropping the leading
/// `config.jpg_dir` from image paths.
pub fn ocr_mapper(config: &BatchConfig) -> PathMapper {
    PathMapper::new(&config.text_dir, &config.base_dir).with_strip_prefix(&config.jpg_dir)
}

/// Tesseract arguments: source image, then destination base name.
pub fn ocr_args(image: &Path, output_stem: &Path) -> Vec<OsString> {
    vec![
        image.as_os_str().to_os_string(),
        output_stem.as_os_str().to_os_string(),
    ]
}

/// Size of `path` in bytes; any failure to probe counts as 0.
pub async fn file_size(path: &Path) -> u64 {
    match tokio::fs::metadata(path).await {
        Ok(m) => m.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => 0,
        Err(e) => {
            warn!("Error getting file size of {}: {}", path.display(), e);
            0
        }
    }
}

/// OCR one image into the mirrored text tree.
///
/// In resume mode an existing, non-empty `.txt` output is left alone and the
/// report carries [`FileOutcome::Skipped`]. An empty output is redone.
pub async fn ocr_image(image: &Path, config: &BatchConfig) -> FileReport {
    let stem = ocr_mapper(config).destination_stem(image);
    let destination = text_file_for(&stem);
    info!("OCR JPG to TEXT: {}", image.display());

    let outcome = match ensure_parent_dir(&stem).await {
        Err(e) => FileOutcome::Failed(e),
        Ok(()) => {
            if config.resume && file_size(&destination).await > 0 {
                debug!("{} exists, skipping", destination.display());
                FileOutcome::Skipped {
                    reason: RESUME_SKIP_REASON.to_string(),
                }
            } else {
                let args = ocr_args(image, &stem);
                match run_tool(&config.ocr_engine, &args, config.process_timeout).await {
                    Ok(output) => FileOutcome::Completed(output),
                    Err(e) => FileOutcome::Failed(e),
                }
            }
        }
    };

    if let FileOutcome::Failed(e) = &outcome {
        warn!("Error processing {}: {}", image.display(), e);
    }

    FileReport {
        stage: Stage::Ocr,
        source: image.to_path_buf(),
        destination,
        outcome,
        pages: Vec::new(),
    }
}
