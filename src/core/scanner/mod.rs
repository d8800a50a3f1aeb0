//! # Scanner Module
//!
//! Discovers candidate image files under a scan root.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - GIF (.gif)
//! - BMP (.bmp)
//! - TIFF (.tiff, .tif)
//! - WebP (.webp)
//! - HEIC (.heic, .heif)
//!
//! Matching is by extension only and ignores case. Content is never sniffed here;
//! a video misnamed `.jpg` is still a candidate and gets hashed like any other file.
//!
//! ## Example
//! ```rust,ignore
//! use dupepix::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! for path in scanner.discover("/Users/photos".as_ref())? {
//!     println!("{}", path?.display());
//! }
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{Discovery, ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use std::fs;
use std::io;
use std::path::Path;

/// Check that `root` exists and is a directory.
///
/// Runs before any job is created, so a bad root never produces a job id.
pub fn validate_root(root: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
            path: root.to_path_buf(),
        },
        _ => ScanError::ReadEntry {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn validate_root_accepts_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_root(temp_dir.path()).is_ok());
    }

    #[test]
    fn validate_root_rejects_missing_path() {
        let result = validate_root(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn validate_root_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, b"abc").unwrap();

        let result = validate_root(&file);
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
