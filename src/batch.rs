//! Batch driver: walk the input tree, rasterize, then OCR.
//!
//! ```text
//!            resume = false           always
//! start ──▶ Rasterize (*.pdf) ──▶ OCR (*.jpg) ──▶ done
//!   │                              ▲
//!   └────────── resume = true ─────┘
//! ```
//!
//! Files are processed one at a time. The [`CancellationFlag`] is checked
//! before each file; once raised the run stops with
//! [`Pdf2TxtError::Interrupted`].

use crate::cancel::CancellationFlag;
use crate::config::BatchConfig;
use crate::error::Pdf2TxtError;
use crate::output::{BatchReport, FileReport, Stage, StageStats};
use crate::pipeline::ocr::ocr_image;
use crate::pipeline::rasterize::rasterize_pdf;
use crate::pipeline::scan::walk_files;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Run both stages over `input_root`.
///
/// # Returns
/// `Ok(BatchReport)` once every discovered file has been attempted, even if
/// some of them failed (check [`BatchReport::failed_files`]).
///
/// # Errors
/// [`Pdf2TxtError::Interrupted`] when `cancel` is raised mid-run.
pub async fn run(
    input_root: impl AsRef<Path>,
    config: &BatchConfig,
    cancel: &CancellationFlag,
) -> Result<BatchReport, Pdf2TxtError> {
    let total_start = Instant::now();
    let input_root = input_root.as_ref();
    let mut report = BatchReport::default();

    if config.resume {
        info!("Resume mode: skipping PDF rasterization");
    } else {
        let (stats, files) = rasterize_tree(input_root, config, cancel).await?;
        report.rasterize = Some(stats);
        report.files.extend(files);
    }

    let (stats, files) = ocr_tree(config, cancel).await?;
    report.ocr = stats;
    report.files.extend(files);

    report.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Batch complete in {}ms: {} OCR output(s), {} skipped, {} failed",
        report.total_duration_ms,
        report.ocr.processed,
        report.ocr.skipped,
        report.failed_files().count()
    );
    Ok(report)
}

/// Blocking wrapper around [`run`] for callers without a Tokio runtime.
pub fn run_sync(
    input_root: impl AsRef<Path>,
    config: &BatchConfig,
    cancel: &CancellationFlag,
) -> Result<BatchReport, Pdf2TxtError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2TxtError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(input_root, config, cancel))
}

/// Rasterize every PDF under `input_root` into `config.jpg_dir`.
///
/// A missing or non-directory `input_root` yields an empty stage, so OCR of
/// images already on disk still runs.
pub async fn rasterize_tree(
    input_root: &Path,
    config: &BatchConfig,
    cancel: &CancellationFlag,
) -> Result<(StageStats, Vec<FileReport>), Pdf2TxtError> {
    let pdfs = match tokio::fs::metadata(input_root).await {
        Ok(m) if m.is_dir() => walk_files(input_root, &config.pdf_pattern),
        Ok(_) => {
            warn!(
                "Input path {} is not a directory; no PDFs to convert",
                input_root.display()
            );
            Vec::new()
        }
        Err(e) => {
            warn!(
                "Input directory {} unreadable ({}); no PDFs to convert",
                input_root.display(),
                e
            );
            Vec::new()
        }
    };
    info!("Rasterizing {} PDF(s) under {}", pdfs.len(), input_root.display());

    run_stage(Stage::Rasterize, pdfs, config, cancel, |pdf| async move {
        rasterize_pdf(&pdf, config).await
    })
    .await
}

/// OCR every image under `config.jpg_dir` into `config.text_dir`.
pub async fn ocr_tree(
    config: &BatchConfig,
    cancel: &CancellationFlag,
) -> Result<(StageStats, Vec<FileReport>), Pdf2TxtError> {
    let images = if config.jpg_dir.is_dir() {
        walk_files(&config.jpg_dir, &config.image_pattern)
    } else {
        warn!(
            "Image directory {} does not exist; nothing to OCR",
            config.jpg_dir.display()
        );
        Vec::new()
    };
    info!(
        "Running OCR on {} image(s) under {}",
        images.len(),
        config.jpg_dir.display()
    );

    run_stage(Stage::Ocr, images, config, cancel, |image| async move {
        ocr_image(&image, config).await
    })
    .await
}

/// Feed `files` one by one through `task`, reporting progress and
/// stopping early on cancellation.
async fn run_stage<F, Fut>(
    stage: Stage,
    files: Vec<PathBuf>,
    config: &BatchConfig,
    cancel: &CancellationFlag,
    task: F,
) -> Result<(StageStats, Vec<FileReport>), Pdf2TxtError>
where
    F: Fn(PathBuf) -> Fut,
    Fut: std::future::Future<Output = FileReport>,
{
    let start = Instant::now();
    let total = files.len();
    let mut stats = StageStats {
        discovered: total,
        ..Default::default()
    };
    let mut reports = Vec::with_capacity(total);

    config.progress.on_stage_start(stage, total);

    for (i, file) in files.into_iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("{} stage interrupted after {}/{} file(s)", stage, i, total);
            return Err(Pdf2TxtError::Interrupted { completed: i });
        }

        config.progress.on_file_start(stage, i + 1, total, &file);
        let report = task(file).await;
        stats.record(&report.outcome);
        config.progress.on_file_complete(&report);
        reports.push(report);
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    config.progress.on_stage_complete(stage, &stats);
    Ok((stats, reports))
}
