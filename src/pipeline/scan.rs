//! Directory walk and file-name pattern matching for both stages.

use crate::config::{DEFAULT_IMAGE_PATTERN, DEFAULT_PDF_PATTERN};
use crate::error::Pdf2TxtError;
use glob::{MatchOptions, Pattern};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

static DEFAULT_PDF: Lazy<FilePattern> =
    Lazy::new(|| FilePattern::new(DEFAULT_PDF_PATTERN).unwrap());
static DEFAULT_IMAGE: Lazy<FilePattern> =
    Lazy::new(|| FilePattern::new(DEFAULT_IMAGE_PATTERN).unwrap());

const IGNORE_CASE: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A shell-style file-name pattern (`*.pdf`, `scan-??.jpg`, `[!x]*.jpg`).
///
/// Matched against the file name only, ignoring case.
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: Pattern,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, Pdf2TxtError> {
        if pattern.is_empty() {
            return Err(Pdf2TxtError::InvalidConfig(
                "File pattern must not be empty".into(),
            ));
        }
        let pattern = Pattern::new(pattern).map_err(|e| {
            Pdf2TxtError::InvalidConfig(format!("Invalid file pattern '{pattern}': {e}"))
        })?;
        Ok(Self { pattern })
    }

    pub(crate) fn default_pdf() -> Self {
        DEFAULT_PDF.clone()
    }

    pub(crate) fn default_image() -> Self {
        DEFAULT_IMAGE.clone()
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches_with(file_name, IGNORE_CASE)
    }
}

/// Recursively list regular files under `root` whose names match `pattern`.
///
/// Entries are visited in file-name order so runs are reproducible.
/// Unreadable entries are logged and skipped.
pub fn walk_files(root: &Path, pattern: &FilePattern) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matched = entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.matches(name));
        if matched {
            files.push(entry.into_path());
        }
    }

    debug!(
        "Found {} file(s) matching '{}' under {}",
        files.len(),
        pattern.as_str(),
        root.display()
    );
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn star_matches_extension_ignoring_case() {
        let p = FilePattern::new("*.pdf").unwrap();
        assert!(p.matches("a.pdf"));
        assert!(p.matches("Report.PDF"));
        assert!(!p.matches("a.pdf.bak"));
        assert!(!p.matches("apdf"));
    }

    #[test]
    fn dot_is_literal() {
        let p = FilePattern::new("*.jpg").unwrap();
        assert!(!p.matches("xjpg"));
        assert!(p.matches("b-12.jpg"));
    }

    #[test]
    fn question_mark_and_classes() {
        let p = FilePattern::new("scan-?[0-9].jpg").unwrap();
        assert!(p.matches("scan-a1.jpg"));
        assert!(!p.matches("scan-ab.jpg"));

        let neg = FilePattern::new("[!x]*.pdf").unwrap();
        assert!(neg.matches("a.pdf"));
        assert!(!neg.matches("x.pdf"));
    }

    #[test]
    fn malformed_pattern_is_config_error() {
        let err = FilePattern::new("a[b.pdf").unwrap_err();
        assert!(matches!(err, Pdf2TxtError::InvalidConfig(ref m) if m.contains("a[b.pdf")));
    }

    #[test]
    fn empty_pattern_rejected() {
        assert!(FilePattern::new("").is_err());
    }

    #[test]
    fn defaults() {
        assert_eq!(FilePattern::default_pdf().as_str(), "*.pdf");
        assert!(FilePattern::default_pdf().matches("X.Pdf"));
        assert!(FilePattern::default_image().matches("x-1.JPG"));
    }

    #[test]
    fn walk_is_recursive_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b/deep")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("dir.pdf")).unwrap();
        fs::write(root.join("b/deep/z.pdf"), b"%PDF").unwrap();
        fs::write(root.join("a/y.PDF"), b"%PDF").unwrap();
        fs::write(root.join("a/notes.txt"), b"").unwrap();
        fs::write(root.join("top.pdf"), b"%PDF").unwrap();

        let pattern = FilePattern::new("*.pdf").unwrap();
        let found = walk_files(root, &pattern);
        assert_eq!(
            found,
            vec![
                root.join("a/y.PDF"),
                root.join("b/deep/z.pdf"),
                root.join("top.pdf"),
            ]
        );
    }

    #[test]
    fn walk_of_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let pattern = FilePattern::new("*.jpg").unwrap();
        assert!(walk_files(&tmp.path().join("missing"), &pattern).is_empty());
    }
}
