//! Path mapping: source file → mirrored destination under an output root.
//!
//! Both stages mirror the directory layout of their input. A source path is
//! first made relative to the base directory, then an optional stage prefix
//! is removed (the image directory, for OCR), and the remainder is re-rooted
//! under the output directory with its extension stripped.
//!
//! Everything is done on [`Component`]s rather than strings, so `jpg` only
//! ever strips a whole leading `jpg`/`JPG` directory and never the front of
//! `jpgs/`.

use crate::error::FileError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Page placeholder plus extension appended to rasterizer destinations.
pub const RASTER_SUFFIX: &str = "-%d.jpg";
/// Extension the OCR engine appends to its output base name.
pub const TEXT_EXTENSION: &str = "txt";

/// Maps source files of one stage into that stage's output tree.
#[derive(Debug, Clone)]
pub struct PathMapper {
    output_root: PathBuf,
    base_dir: PathBuf,
    strip_prefix: Vec<String>,
}

impl PathMapper {
    pub fn new(output_root: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            base_dir: base_dir.into(),
            strip_prefix: Vec::new(),
        }
    }

    /// Remove this leading directory (compared per component, ignoring case)
    /// from source paths before re-rooting them.
    pub fn with_strip_prefix(mut self, prefix: impl AsRef<Path>) -> Self {
        let rel = relativize(prefix.as_ref(), &self.base_dir);
        self.strip_prefix = rel.components().map(folded).collect();
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Destination for `file` without any extension: `<root>/<mirrored>/<stem>`.
    pub fn destination_stem(&self, file: &Path) -> PathBuf {
        let rel = relativize(file, &self.base_dir);
        let rel = trim_leading(&self.strip(&rel));

        let parent = rel.parent().unwrap_or_else(|| Path::new(""));
        let stem = rel
            .file_stem()
            .or_else(|| file.file_stem())
            .unwrap_or_default();

        self.output_root.join(parent).join(stem)
    }

    /// Rasterizer output pattern: `<root>/<mirrored>/<stem>-%d.jpg`.
    ///
    /// Literal `%` in the mirrored path is doubled so the rasterizer only
    /// sees one format directive.
    pub fn raster_pattern(&self, file: &Path) -> PathBuf {
        append(escape_percent(self.destination_stem(file)), RASTER_SUFFIX)
    }

    /// OCR text output: `<root>/<mirrored>/<stem>.txt`.
    pub fn text_path(&self, file: &Path) -> PathBuf {
        text_file_for(&self.destination_stem(file))
    }

    fn strip(&self, rel: &Path) -> PathBuf {
        if self.strip_prefix.is_empty() {
            return rel.to_path_buf();
        }

        let mut components = rel.components();
        for expected in &self.strip_prefix {
            match components.next() {
                Some(c) if folded(c) == *expected => {}
                _ => return rel.to_path_buf(),
            }
        }
        components.as_path().to_path_buf()
    }
}

/// The `.txt` file the OCR engine writes for a given base name.
pub fn text_file_for(stem: &Path) -> PathBuf {
    let mut s = stem.as_os_str().to_os_string();
    s.push(".");
    s.push(TEXT_EXTENSION);
    PathBuf::from(s)
}

/// Create the parent directory of `dest` (recursively, idempotent).
pub async fn ensure_parent_dir(dest: &Path) -> Result<(), FileError> {
    let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(parent).await.is_ok_and(|m| m.is_dir()) {
        return Ok(());
    }
    debug!("Creating output directory {}", parent.display());
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| FileError::OutputDir {
            path: parent.to_path_buf(),
            detail: e.to_string(),
        })
}

/// Make `path` relative to `base`, then drop any leading `..`.
///
/// Paths on another root or volume than `base` fall back to dropping their
/// root and drive components.
fn relativize(path: &Path, base: &Path) -> PathBuf {
    if !path.is_absolute() {
        return trim_leading(path);
    }
    match relative_to(path, base) {
        Some(rel) => trim_leading(&rel),
        None => trim_leading(path),
    }
}

/// `path` relative to `base`, climbing out of `base` with `..` where the two
/// diverge. `None` when their root or drive components differ.
fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path: Vec<Component<'_>> = path.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();

    let is_root = |c: &Component<'_>| matches!(c, Component::Prefix(_) | Component::RootDir);
    let path_roots = path.iter().take_while(|&c| is_root(c)).count();
    let base_roots = base.iter().take_while(|&c| is_root(c)).count();
    if path_roots == 0 || path[..path_roots] != base[..base_roots] {
        return None;
    }

    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push(Component::ParentDir);
    }
    for c in &path[common..] {
        rel.push(c);
    }
    Some(rel)
}

/// Drop leading drive, root, `.` and `..` components.
fn trim_leading(path: &Path) -> PathBuf {
    path.components()
        .skip_while(|c| {
            matches!(
                c,
                Component::Prefix(_) | Component::RootDir | Component::CurDir | Component::ParentDir
            )
        })
        .collect()
}

fn folded(c: Component<'_>) -> String {
    c.as_os_str().to_string_lossy().to_lowercase()
}

fn escape_percent(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains('%') => PathBuf::from(s.replace('%', "%%")),
        _ => path,
    }
}

fn append(path: PathBuf, suffix: &str) -> PathBuf {
    let mut s: OsString = path.into_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(base: &str) -> PathMapper {
        PathMapper::new("jpg", base)
    }

    fn ocr(base: &str) -> PathMapper {
        PathMapper::new("text", base).with_strip_prefix("jpg")
    }

    #[test]
    fn raster_pattern_mirrors_input_tree() {
        let m = raster("/work");
        assert_eq!(
            m.raster_pattern(Path::new("in/a/b.pdf")),
            PathBuf::from("jpg/in/a/b-%d.jpg")
        );
    }

    #[test]
    fn text_path_strips_image_dir() {
        let m = ocr("/work");
        assert_eq!(
            m.destination_stem(Path::new("jpg/in/a/b-3.jpg")),
            PathBuf::from("text/in/a/b-3")
        );
        assert_eq!(
            m.text_path(Path::new("jpg/in/a/b-3.jpg")),
            PathBuf::from("text/in/a/b-3.txt")
        );
    }

    #[test]
    fn prefix_strip_ignores_case() {
        let m = ocr("/work");
        assert_eq!(
            m.destination_stem(Path::new("JPG/Scans/x-1.jpg")),
            PathBuf::from("text/Scans/x-1")
        );
    }

    #[test]
    fn prefix_strip_is_per_component() {
        let m = ocr("/work");
        assert_eq!(
            m.destination_stem(Path::new("jpgs/x-1.jpg")),
            PathBuf::from("text/jpgs/x-1")
        );
    }

    #[test]
    fn multi_component_prefix() {
        let m = PathMapper::new("out/text", "/work").with_strip_prefix("./out/jpg");
        assert_eq!(
            m.destination_stem(Path::new("out/JPG/a/b-1.jpg")),
            PathBuf::from("out/text/a/b-1")
        );
        // Only part of the prefix matches: nothing is stripped.
        assert_eq!(
            m.destination_stem(Path::new("out/png/b-1.jpg")),
            PathBuf::from("out/text/out/png/b-1")
        );
    }

    #[test]
    fn leading_dot_segments_are_dropped() {
        let m = raster("/work");
        assert_eq!(
            m.raster_pattern(Path::new("./in/b.pdf")),
            PathBuf::from("jpg/in/b-%d.jpg")
        );
        assert_eq!(
            m.raster_pattern(Path::new("../shared/b.pdf")),
            PathBuf::from("jpg/shared/b-%d.jpg")
        );
    }

    #[test]
    fn only_last_extension_is_removed() {
        let m = raster("/work");
        assert_eq!(
            m.raster_pattern(Path::new("in/report.v2.pdf")),
            PathBuf::from("jpg/in/report.v2-%d.jpg")
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_path_under_base_is_made_relative() {
        let m = raster("/work");
        assert_eq!(
            m.raster_pattern(Path::new("/work/in/a/b.pdf")),
            PathBuf::from("jpg/in/a/b-%d.jpg")
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_path_outside_base_drops_root() {
        let m = raster("/work");
        assert_eq!(
            m.raster_pattern(Path::new("/mnt/pdfs/b.pdf")),
            PathBuf::from("jpg/mnt/pdfs/b-%d.jpg")
        );
    }

    #[cfg(unix)]
    #[test]
    fn sibling_of_base_maps_like_its_relative_spelling() {
        let m = raster("/work/proj");
        let expected = PathBuf::from("jpg/docs/a/b-%d.jpg");
        assert_eq!(m.raster_pattern(Path::new("/work/docs/a/b.pdf")), expected);
        assert_eq!(m.raster_pattern(Path::new("../docs/a/b.pdf")), expected);
    }

    #[cfg(unix)]
    #[test]
    fn relative_to_climbs_out_of_base() {
        assert_eq!(
            relative_to(Path::new("/work/docs/a.pdf"), Path::new("/work/proj/sub")),
            Some(PathBuf::from("../../docs/a.pdf"))
        );
        assert_eq!(
            relative_to(Path::new("/work/proj/a.pdf"), Path::new("/work/proj")),
            Some(PathBuf::from("a.pdf"))
        );
        assert_eq!(relative_to(Path::new("/work/a.pdf"), Path::new("work")), None);
    }

    #[test]
    fn percent_in_name_is_escaped_for_rasterizer() {
        let m = raster("/work");
        assert_eq!(
            m.raster_pattern(Path::new("in/50%done.pdf")),
            PathBuf::from("jpg/in/50%%done-%d.jpg")
        );
        assert_eq!(
            m.destination_stem(Path::new("in/50%done.pdf")),
            PathBuf::from("jpg/in/50%done")
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_image_dir_prefix_is_stripped() {
        let m = PathMapper::new("/work/text", "/work").with_strip_prefix("/work/jpg");
        assert_eq!(
            m.destination_stem(Path::new("/work/jpg/in/b-1.jpg")),
            PathBuf::from("/work/text/in/b-1")
        );
    }

    #[test]
    fn text_file_for_appends_extension() {
        assert_eq!(
            text_file_for(Path::new("text/a/b-1")),
            PathBuf::from("text/a/b-1.txt")
        );
    }

    #[tokio::test]
    async fn ensure_parent_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("a/b/c-%d.jpg");
        ensure_parent_dir(&dest).await.unwrap();
        ensure_parent_dir(&dest).await.unwrap();
        assert!(tmp.path().join("a/b").is_dir());
    }

    #[tokio::test]
    async fn ensure_parent_dir_reports_blocked_path() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("file"), b"x").unwrap();
        let dest = tmp.path().join("file/sub/out.txt");
        let err = ensure_parent_dir(&dest).await.unwrap_err();
        assert!(matches!(err, FileError::OutputDir { .. }));
    }
}
