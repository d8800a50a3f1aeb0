//! # Hasher Module
//!
//! Computes content digests for discovered files.
//!
//! ## How It Works
//! 1. Open the file and read its size from metadata
//! 2. Stream fixed-size chunks into a BLAKE3 hasher
//! 3. Emit a [`PhotoRecord`] with the lowercase hex digest
//!
//! BLAKE3 is the only digest used anywhere in the crate, so digests from
//! different runs are always comparable.
//!
//! ## Example
//! ```rust,ignore
//! use dupepix::core::hasher::{ContentHasher, FileHasher};
//!
//! let record = ContentHasher::new().hash_file("/photos/a.jpg".as_ref())?;
//! println!("{} {}", record.digest, record.size);
//! ```

mod content;
mod traits;

pub use content::{ContentHasher, DEFAULT_CHUNK_SIZE};
pub use traits::FileHasher;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A hashed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Path as discovered (relative to the scan root if the root was relative)
    pub path: PathBuf,
    /// Hex-encoded content digest
    #[serde(alias = "hash")]
    pub digest: String,
    /// File size in bytes
    pub size: u64,
}

impl PhotoRecord {
    pub fn new(path: impl Into<PathBuf>, digest: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            digest: digest.into(),
            size,
        }
    }
}
