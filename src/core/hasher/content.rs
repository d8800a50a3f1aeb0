//! Streaming BLAKE3 content hasher.

use super::{FileHasher, PhotoRecord};
use crate::error::HashError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read buffer size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Hashes file content in fixed-size chunks.
///
/// Memory use is bounded by the chunk size regardless of file size.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the read buffer size. Zero is bumped to one byte.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    fn digest(&self, path: &Path) -> std::io::Result<(String, u64)> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..read]);
        }

        Ok((hasher.finalize().to_hex().to_string(), size))
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHasher for ContentHasher {
    fn hash_file(&self, path: &Path) -> Result<PhotoRecord, HashError> {
        let (digest, size) = self
            .digest(path)
            .map_err(|e| HashError::from_io(path, e))?;

        Ok(PhotoRecord {
            path: path.to_path_buf(),
            digest,
            size,
        })
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}
