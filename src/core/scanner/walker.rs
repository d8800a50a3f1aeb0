//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::validate_root;
use crate::error::ScanError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
#[derive(Debug, Clone)]
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { config, filter }
    }

    /// Start a walk under `root`.
    ///
    /// Fails up front if `root` is missing or not a directory. The returned iterator
    /// is lazy and yields candidate paths in file-name order within each directory.
    pub fn discover(&self, root: &Path) -> Result<Discovery, ScanError> {
        validate_root(root)?;

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(Discovery {
            root: root.to_path_buf(),
            inner: walker.into_iter(),
            filter: self.filter.clone(),
            skipped_entries: 0,
            finished: false,
        })
    }
}

impl Default for WalkDirScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// A single, non-restartable walk over a scan root.
///
/// Yields `Ok(path)` for every candidate file. Unreadable entries below the root
/// are logged and skipped; an error on the root itself is yielded once as `Err`
/// and ends the walk.
pub struct Discovery {
    root: PathBuf,
    inner: walkdir::IntoIter,
    filter: ImageFilter,
    skipped_entries: usize,
    finished: bool,
}

impl Discovery {
    /// Entries that could not be read and were skipped so far
    pub fn skipped_entries(&self) -> usize {
        self.skipped_entries
    }

    fn entry_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        if error.io_error().map(io::Error::kind) == Some(io::ErrorKind::PermissionDenied) {
            ScanError::PermissionDenied { path }
        } else {
            ScanError::ReadEntry {
                path,
                source: io::Error::from(error),
            }
        }
    }
}

impl Iterator for Discovery {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let entry = match self.inner.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Ok(entry)) => entry,
                Some(Err(error)) if error.depth() == 0 => {
                    self.finished = true;
                    return Some(Err(ScanError::RootUnreadable {
                        path: self.root.clone(),
                        reason: error.to_string(),
                    }));
                }
                Some(Err(error)) => {
                    let error = self.entry_error(error);
                    warn!("Skipping unreadable entry: {}", error);
                    self.skipped_entries += 1;
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if entry.depth() > 0 && !self.filter.includes_hidden() && is_hidden(entry.path())
                {
                    debug!("Skipping hidden directory {}", entry.path().display());
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if !self.filter.should_include(entry.path()) {
                continue;
            }

            return Some(Ok(entry.into_path()));
        }
    }
}
