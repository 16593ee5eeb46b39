//! CLI binary for pdf2txt.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`,
//! draws progress, and turns the run result into an exit code.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2txt::{
    run, BatchConfig, BatchProgressCallback, BatchReport, CancellationFlag, ExternalTool,
    FileOutcome, FileReport, Pdf2TxtError, ProgressCallback, Stage, StageStats,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

const USAGE_ERROR: &str =
    "Please specify the root directory of PDF input files (-h/--help for help)";

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one progress bar per stage plus a log line
/// per file. Without a bar (`--no-progress`, `--json`) the log lines go
/// straight to stderr.
struct CliProgressCallback {
    /// Bar for the stage currently running.
    bar: Mutex<Option<ProgressBar>>,
    show_bar: bool,
    /// Echo tool output for every file, not just failures.
    verbose: bool,
}

impl CliProgressCallback {
    fn new(show_bar: bool, verbose: bool) -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            show_bar,
            verbose,
        })
    }

    fn lock_bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, line: String) {
        match self.lock_bar().as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn emit_tool_output(&self, stdout: &str, stderr: &str) {
        for line in stdout.lines().chain(stderr.lines()) {
            let line = line.trim_end();
            if !line.is_empty() {
                self.emit(format!("      {}", dim(line)));
            }
        }
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Rasterize => "PDF → JPG",
        Stage::Ocr => "JPG → TEXT",
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage, total_files: usize) {
        if self.show_bar {
            let bar = ProgressBar::new(total_files as u64);
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>4}/{len} files  \
                 ⏱ {elapsed_precise}  ETA {eta_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);
            bar.set_style(style);
            bar.set_prefix(stage_label(stage));
            bar.enable_steady_tick(Duration::from_millis(80));
            *self.lock_bar() = Some(bar);
        }

        self.emit(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{}: {total_files} file(s)", stage_label(stage)))
        ));
    }

    fn on_file_start(&self, _stage: Stage, _index: usize, _total: usize, path: &Path) {
        if let Some(bar) = self.lock_bar().as_ref() {
            bar.set_message(path.display().to_string());
        }
    }

    fn on_file_complete(&self, report: &FileReport) {
        let source = report.source.display().to_string();
        match &report.outcome {
            FileOutcome::Completed(out) if out.success => {
                let detail = if report.stage == Stage::Rasterize {
                    format!("{} page(s)", report.pages.len())
                } else {
                    report.destination.display().to_string()
                };
                self.emit(format!(
                    "  {} {}  {}  {}",
                    green("✓"),
                    source,
                    dim(&detail),
                    dim(&format!("{:.1}s", out.duration_ms as f64 / 1000.0)),
                ));
                if self.verbose {
                    self.emit_tool_output(&out.stdout, &out.stderr);
                }
            }
            FileOutcome::Completed(out) => {
                let status = out
                    .exit_code
                    .map(|c| format!("exit {c}"))
                    .unwrap_or_else(|| "killed by signal".into());
                self.emit(format!("  {} {}  {}", red("✗"), source, red(&status)));
                self.emit_tool_output(&out.stdout, &out.stderr);
            }
            FileOutcome::Skipped { reason } => {
                self.emit(format!("  {} {}  {}", yellow("↷"), source, dim(reason)));
            }
            FileOutcome::Failed(err) => {
                self.emit(format!("  {} {}  {}", red("✗"), source, red(&err.to_string())));
            }
        }

        if let Some(bar) = self.lock_bar().as_ref() {
            bar.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: Stage, stats: &StageStats) {
        if let Some(bar) = self.lock_bar().take() {
            bar.finish_and_clear();
        }

        let mark = if stats.failed == 0 {
            green("✔")
        } else if stats.failed == stats.discovered {
            red("✘")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{} {}  {} done, {} skipped, {} failed  {}",
            mark,
            bold(stage_label(stage)),
            stats.processed,
            stats.skipped,
            if stats.failed > 0 {
                red(&stats.failed.to_string())
            } else {
                stats.failed.to_string()
            },
            dim(&format!("{}ms", stats.duration_ms)),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rasterize every PDF under scans/ at 400 DPI, then OCR the pages
  pdf2txt scans

  # Lower resolution, custom output trees
  pdf2txt -d 300 -j out/jpg -t out/text scans

  # Restart an interrupted batch: no rasterization, finished pages skipped
  pdf2txt --resume scans

  # Machine-readable summary
  pdf2txt --json --no-progress scans > report.json

OUTPUT LAYOUT:
  <jpgdir>/<mirrored path>/<name>-<page>.jpg
  <textdir>/<mirrored path>/<name>-<page>.txt

ENVIRONMENT VARIABLES:
  PDF2TXT_GS          Ghostscript executable (default: gs, gswin64c on Windows)
  PDF2TXT_TESSERACT   Tesseract executable (default: tesseract)
  RUST_LOG            Override the log filter (e.g. pdf2txt=debug)

EXIT CODES:
  0    batch finished (individual file failures are reported, not fatal)
  1    interrupted with Ctrl+C, or a fatal error
  255  no input directory given
"#;

/// Batch-convert PDF files to JPEG pages and OCR text.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Batch-convert PDF files to JPEG pages and OCR text",
    long_about = "Walk a directory of PDFs, rasterize every page to JPEG with Ghostscript, \
then OCR every page with Tesseract. Both output trees mirror the input layout.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root directory of PDF input files.
    input: Option<PathBuf>,

    /// JPEG resolution in DPI.
    #[arg(short, long, env = "PDF2TXT_DPI", default_value_t = pdf2txt::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// JPEG output directory.
    #[arg(short, long = "jpgdir", env = "PDF2TXT_JPGDIR", default_value = pdf2txt::config::DEFAULT_JPG_DIR)]
    jpg_dir: PathBuf,

    /// Text output directory.
    #[arg(short, long = "textdir", env = "PDF2TXT_TEXTDIR", default_value = pdf2txt::config::DEFAULT_TEXT_DIR)]
    text_dir: PathBuf,

    /// Resume OCR to text: skip rasterization and pages already converted.
    #[arg(short, long, env = "PDF2TXT_RESUME")]
    resume: bool,

    /// Ghostscript executable.
    #[arg(long, env = "PDF2TXT_GS", default_value = pdf2txt::config::default_rasterizer_program())]
    gs: PathBuf,

    /// Tesseract executable.
    #[arg(long, env = "PDF2TXT_TESSERACT", default_value = pdf2txt::config::default_ocr_program())]
    tesseract: PathBuf,

    /// File-name pattern selecting PDFs.
    #[arg(long, env = "PDF2TXT_PDF_PATTERN", default_value = pdf2txt::config::DEFAULT_PDF_PATTERN)]
    pdf_pattern: String,

    /// File-name pattern selecting page images for OCR.
    #[arg(long, env = "PDF2TXT_IMAGE_PATTERN", default_value = pdf2txt::config::DEFAULT_IMAGE_PATTERN)]
    image_pattern: String,

    /// Kill an external program after this many seconds.
    #[arg(long, env = "PDF2TXT_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs and echo all tool output.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(input) = cli.input.clone() else {
        println!("{USAGE_ERROR}");
        std::process::exit(-1);
    };

    if !cli.quiet {
        eprintln!("{} {}\n", bold("pdf2txt"), dim(env!("CARGO_PKG_VERSION")));
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.quiet {
        None
    } else {
        let cb = CliProgressCallback::new(show_progress, cli.verbose);
        Some(cb as Arc<dyn BatchProgressCallback>)
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Interrupt handling ───────────────────────────────────────────────
    let cancel = CancellationFlag::new();
    spawn_interrupt_handler(cancel.clone());

    // ── Run ──────────────────────────────────────────────────────────────
    let report = match run(&input, &config, &cancel).await {
        Ok(report) => report,
        Err(Pdf2TxtError::Interrupted { completed }) => {
            eprintln!(
                "{} interrupted after {completed} file(s) in the current stage",
                red("✘")
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Batch failed"),
    };

    print_summary(&cli, &report)
}

/// First Ctrl+C stops the batch after the file in flight; a second one exits
/// immediately.
fn spawn_interrupt_handler(cancel: CancellationFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        eprintln!(
            "\n{} You pressed Ctrl+C! Stopping after the current file (Ctrl+C again to quit now)",
            red("■")
        );
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{} Aborted", red("■"));
            std::process::exit(1);
        }
    });
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .dpi(cli.dpi)
        .jpg_dir(&cli.jpg_dir)
        .text_dir(&cli.text_dir)
        .resume(cli.resume)
        .rasterizer(ExternalTool::new(&cli.gs))
        .ocr_engine(ExternalTool::new(&cli.tesseract))
        .pdf_pattern(&cli.pdf_pattern)
        .image_pattern(&cli.image_pattern);

    if let Some(secs) = cli.timeout {
        builder = builder.process_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(cli: &Cli, report: &BatchReport) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    let failed = report.failed_files().count();
    eprintln!(
        "\n{}  {} text file(s) written, {} skipped, {} failed  →  {}  ({}ms)",
        if failed == 0 { green("✔") } else { cyan("⚠") },
        report.ocr.processed,
        report.ocr.skipped,
        failed,
        bold(&cli.text_dir.display().to_string()),
        report.total_duration_ms,
    );
    for file in report.failed_files() {
        eprintln!("   {} {}", red("✗"), file.source.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_survives_poisoned_bar_lock() {
        let cb = CliProgressCallback::new(false, false);
        let other = Arc::clone(&cb);
        let _ = std::thread::spawn(move || {
            let _guard = other.lock_bar();
            panic!("panic while holding the bar lock");
        })
        .join();
        assert!(cb.bar.is_poisoned());

        cb.on_stage_start(Stage::Ocr, 1);
        cb.on_stage_complete(Stage::Ocr, &StageStats::default());
        assert!(cb.lock_bar().is_none());
    }
}
