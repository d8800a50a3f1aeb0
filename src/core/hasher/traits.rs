//! The hashing seam used by scan jobs.

use super::PhotoRecord;
use crate::error::HashError;
use std::path::Path;

/// Turns a file into a [`PhotoRecord`].
///
/// Scan jobs call this once per discovered file from their worker thread. Every
/// error is treated as recoverable: the file is skipped and the scan goes on.
/// Implement this trait to substitute the hasher (e.g., in tests).
pub trait FileHasher: Send + Sync {
    fn hash_file(&self, path: &Path) -> Result<PhotoRecord, HashError>;

    /// Short name for logs
    fn name(&self) -> &'static str {
        "custom"
    }
}
