//! Configuration types for a batch run.
//!
//! All run behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The configuration is immutable for the duration of
//! a run and is passed explicitly into every stage, including the paths of
//! the two external programs.

use crate::error::Pdf2TxtError;
use crate::pipeline::scan::FilePattern;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default rasterization resolution.
pub const DEFAULT_DPI: u32 = 400;
/// Default image output directory.
pub const DEFAULT_JPG_DIR: &str = "jpg";
/// Default text output directory.
pub const DEFAULT_TEXT_DIR: &str = "text";
/// Default pattern for the rasterizer stage walk.
pub const DEFAULT_PDF_PATTERN: &str = "*.pdf";
/// Default pattern for the OCR stage walk.
pub const DEFAULT_IMAGE_PATTERN: &str = "*.jpg";

/// Default Ghostscript executable for this platform.
pub fn default_rasterizer_program() -> &'static str {
    if cfg!(windows) {
        "gswin64c"
    } else {
        "gs"
    }
}

/// Default Tesseract executable.
pub fn default_ocr_program() -> &'static str {
    "tesseract"
}

/// An external program plus arguments that precede the ones a stage adds.
///
/// Leading arguments let callers wrap a tool (`/bin/sh fake-gs.sh`) or pin
/// flags the stage does not manage (`gs -q`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn leading_args(&self) -> &[OsString] {
        &self.leading_args
    }

    /// Program name for log lines and error messages.
    pub fn display_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Configuration for one batch run.
///
/// # Example
/// ```rust
/// use pdf2txt::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .dpi(300)
///     .jpg_dir("scans/jpg")
///     .text_dir("scans/text")
///     .resume(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Rasterization resolution in dots per inch. Default: 400.
    pub dpi: u32,

    /// Root of the mirrored JPEG tree. Default: `jpg`.
    pub jpg_dir: PathBuf,

    /// Root of the mirrored text tree. Default: `text`.
    pub text_dir: PathBuf,

    /// Resume mode: skip rasterization and skip OCR for images whose
    /// non-empty text output already exists. Default: false.
    pub resume: bool,

    /// PDF rasterizer (Ghostscript).
    pub rasterizer: ExternalTool,

    /// OCR engine (Tesseract).
    pub ocr_engine: ExternalTool,

    /// File-name pattern selecting PDFs under the input root. Default: `*.pdf`.
    pub pdf_pattern: FilePattern,

    /// File-name pattern selecting images under `jpg_dir`. Default: `*.jpg`.
    pub image_pattern: FilePattern,

    /// Kill an external invocation after this long. Default: None (wait forever).
    pub process_timeout: Option<Duration>,

    /// Directory that source paths are made relative to before mirroring.
    /// Default: the process working directory at build time.
    pub base_dir: PathBuf,

    /// Receives per-stage and per-file events.
    pub progress: ProgressCallback,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            jpg_dir: PathBuf::from(DEFAULT_JPG_DIR),
            text_dir: PathBuf::from(DEFAULT_TEXT_DIR),
            resume: false,
            rasterizer: ExternalTool::new(default_rasterizer_program()),
            ocr_engine: ExternalTool::new(default_ocr_program()),
            pdf_pattern: FilePattern::default_pdf(),
            image_pattern: FilePattern::default_image(),
            process_timeout: None,
            base_dir: std::env::current_dir().unwrap_or_default(),
            progress: Arc::new(NoopProgressCallback),
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("dpi", &self.dpi)
            .field("jpg_dir", &self.jpg_dir)
            .field("text_dir", &self.text_dir)
            .field("resume", &self.resume)
            .field("rasterizer", &self.rasterizer)
            .field("ocr_engine", &self.ocr_engine)
            .field("pdf_pattern", &self.pdf_pattern.as_str())
            .field("image_pattern", &self.image_pattern.as_str())
            .field("process_timeout", &self.process_timeout)
            .field("base_dir", &self.base_dir)
            .field("progress", &"<dyn BatchProgressCallback>")
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
            pdf_pattern: None,
            image_pattern: None,
            timeout_secs: None,
        }
    }
}

/// Builder for [`BatchConfig`].
pub struct BatchConfigBuilder {
    config: BatchConfig,
    pdf_pattern: Option<String>,
    image_pattern: Option<String>,
    timeout_secs: Option<u64>,
}

impl BatchConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn jpg_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.jpg_dir = dir.into();
        self
    }

    pub fn text_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.text_dir = dir.into();
        self
    }

    pub fn resume(mut self, v: bool) -> Self {
        self.config.resume = v;
        self
    }

    pub fn rasterizer(mut self, tool: ExternalTool) -> Self {
        self.config.rasterizer = tool;
        self
    }

    pub fn ocr_engine(mut self, tool: ExternalTool) -> Self {
        self.config.ocr_engine = tool;
        self
    }

    pub fn pdf_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pdf_pattern = Some(pattern.into());
        self
    }

    pub fn image_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.image_pattern = Some(pattern.into());
        self
    }

    pub fn process_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress = cb;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Pdf2TxtError> {
        let mut config = self.config;

        if config.dpi == 0 {
            return Err(Pdf2TxtError::InvalidConfig(
                "DPI must be a positive integer".into(),
            ));
        }
        if config.jpg_dir.as_os_str().is_empty() {
            return Err(Pdf2TxtError::InvalidConfig(
                "JPEG output directory must not be empty".into(),
            ));
        }
        if config.text_dir.as_os_str().is_empty() {
            return Err(Pdf2TxtError::InvalidConfig(
                "Text output directory must not be empty".into(),
            ));
        }
        if config.rasterizer.program().as_os_str().is_empty()
            || config.ocr_engine.program().as_os_str().is_empty()
        {
            return Err(Pdf2TxtError::InvalidConfig(
                "External program paths must not be empty".into(),
            ));
        }

        if let Some(p) = self.pdf_pattern {
            config.pdf_pattern = FilePattern::new(&p)?;
        }
        if let Some(p) = self.image_pattern {
            config.image_pattern = FilePattern::new(&p)?;
        }

        match self.timeout_secs {
            Some(0) => {
                return Err(Pdf2TxtError::InvalidConfig(
                    "Process timeout must be at least 1 second".into(),
                ))
            }
            Some(secs) => config.process_timeout = Some(Duration::from_secs(secs)),
            None => {}
        }

        Ok(config)
    }
}
