//! Rasterizer stage: one PDF → numbered JPEG pages via Ghostscript.
//!
//! The output pattern carries a `%d` page placeholder, so a multi-page PDF
//! expands into `<stem>-1.jpg`, `<stem>-2.jpg`, … in the mirrored directory.
//! Existing page images are overwritten.

use crate::config::BatchConfig;
use crate::output::{FileOutcome, FileReport, Stage};
use crate::pipeline::paths::{ensure_parent_dir, PathMapper};
use crate::pipeline::process::run_tool;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static RE_PAGE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^-(\d+)\.jpg$").unwrap());

/// Mapper from the input tree into `config.jpg_dir`.
pub fn raster_mapper(config: &BatchConfig) -> PathMapper {
    PathMapper::new(&config.jpg_dir, &config.base_dir)
}

/// Ghostscript arguments for rendering `pdf` to JPEG pages at `dpi`.
pub fn rasterizer_args(dpi: u32, output_pattern: &Path, pdf: &Path) -> Vec<OsString> {
    let mut output_file = OsString::from("-sOutputFile=");
    output_file.push(output_pattern);

    vec![
        OsString::from("-dNOPAUSE"),
        OsString::from(format!("-r{dpi}")),
        OsString::from("-sDEVICE=jpeg"),
        OsString::from("-dBATCH"),
        output_file,
        pdf.as_os_str().to_os_string(),
    ]
}

/// Rasterize one PDF into the mirrored image tree.
///
/// Never fails: directory or launch problems are returned as
/// [`FileOutcome::Failed`] so the stage can continue with the next PDF.
pub async fn rasterize_pdf(pdf: &Path, config: &BatchConfig) -> FileReport {
    let mapper = raster_mapper(config);
    let stem = mapper.destination_stem(pdf);
    let destination = mapper.raster_pattern(pdf);
    info!("Convert PDF to JPG: {}", pdf.display());

    let mut pages = Vec::new();
    let outcome = match ensure_parent_dir(&stem).await {
        Err(e) => FileOutcome::Failed(e),
        Ok(()) => {
            let args = rasterizer_args(config.dpi, &destination, pdf);
            match run_tool(&config.rasterizer, &args, config.process_timeout).await {
                Ok(output) => {
                    pages = list_pages(&stem).await;
                    if output.success && pages.is_empty() {
                        warn!("{} produced no page images", pdf.display());
                    } else {
                        debug!("{} → {} page(s)", pdf.display(), pages.len());
                    }
                    FileOutcome::Completed(output)
                }
                Err(e) => FileOutcome::Failed(e),
            }
        }
    };

    if let FileOutcome::Failed(e) = &outcome {
        warn!("Error converting {} to JPG: {}", pdf.display(), e);
    }

    FileReport {
        stage: Stage::Rasterize,
        source: pdf.to_path_buf(),
        destination,
        outcome,
        pages,
    }
}

/// Page images `<stem>-<n>.jpg` next to `stem`, ordered by page number.
///
/// `stem` is the unescaped destination stem, as the files appear on disk.
pub async fn list_pages(stem: &Path) -> Vec<PathBuf> {
    let Some(dir) = stem.parent() else {
        return Vec::new();
    };
    let Some(stem) = stem.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };

    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut pages: Vec<(u64, PathBuf)> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(rest) = name.to_str().and_then(|n| n.strip_prefix(stem)) else {
            continue;
        };
        if let Some(caps) = RE_PAGE_SUFFIX.captures(rest) {
            if let Ok(n) = caps[1].parse::<u64>() {
                pages.push((n, entry.path()));
            }
        }
    }

    pages.sort_by_key(|(n, _)| *n);
    pages.into_iter().map(|(_, p)| p).collect()
}
