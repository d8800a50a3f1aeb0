//! Extension allow-list for candidate files.

use std::collections::HashSet;
use std::path::Path;

const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif",
];

/// Decides whether a file is a scan candidate
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// Lowercase extensions without the leading dot
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl ImageFilter {
    /// Filter with the default extension list, hidden files included
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: true,
        }
    }

    /// Include or skip dot-files
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Replace the extension list. Leading dots and case are normalised.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn includes_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Check if a file should be hashed
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Dot-file or dot-directory
pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_baseline_formats_in_any_case() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/photos/image.jpg")));
        assert!(filter.should_include(Path::new("/photos/image.JPEG")));
        assert!(filter.should_include(Path::new("/photos/image.Png")));
        assert!(filter.should_include(Path::new("/photos/anim.GIF")));
    }

    #[test]
    fn filter_excludes_non_images() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/document.pdf")));
        assert!(!filter.should_include(Path::new("/photos/video.mp4")));
        assert!(!filter.should_include(Path::new("/photos/no_extension")));
    }

    #[test]
    fn filter_includes_hidden_by_default() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/photos/.hidden.jpg")));
    }

    #[test]
    fn filter_can_skip_hidden() {
        let filter = ImageFilter::new().with_hidden(false);
        assert!(!filter.should_include(Path::new("/photos/.hidden.jpg")));
        assert!(filter.should_include(Path::new("/photos/visible.jpg")));
    }

    #[test]
    fn custom_extensions_are_normalised() {
        let filter = ImageFilter::new().with_extensions([".RAW", "dng", ""]);
        assert!(filter.should_include(Path::new("/photos/shot.raw")));
        assert!(filter.should_include(Path::new("/photos/shot.DNG")));
        assert!(!filter.should_include(Path::new("/photos/shot.jpg")));
    }
}
