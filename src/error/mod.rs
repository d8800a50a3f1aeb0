//! # Error Module
//!
//! Error types for the duplicate scan pipeline.
//!
//! ## Taxonomy
//! - [`DupePixError::InvalidInput`] - bad scan root, rejected before a job exists
//! - [`ScanError`] / [`HashError`] - per-entry failures, logged and skipped
//! - [`JobError`] - whole-pipeline failures that end a job in the `error` state
//! - [`DupePixError::NotFound`] / [`DupePixError::NotReady`] - status and report queries

use crate::core::job::{JobId, JobStatus};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level library error
#[derive(Error, Debug)]
pub enum DupePixError {
    #[error("Invalid scan root {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    #[error("No scan job with id {id}")]
    NotFound { id: JobId },

    #[error("Report for job {id} is not ready (status: {status})")]
    NotReady { id: JobId, status: JobStatus },

    #[error("Scan job failed: {0}")]
    Job(#[from] JobError),

    #[error("Failed to spawn scan worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Job registry lock poisoned")]
    Poisoned,
}

impl DupePixError {
    pub(crate) fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that occur while walking a directory tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan root {path} became unreadable: {reason}")]
    RootUnreadable { path: PathBuf, reason: String },
}

/// Errors that occur while hashing a single file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => HashError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => HashError::PermissionDenied { path },
            _ => HashError::Io { path, source },
        }
    }

    /// Path of the file that could not be hashed
    pub fn path(&self) -> &std::path::Path {
        match self {
            HashError::NotFound { path }
            | HashError::PermissionDenied { path }
            | HashError::Io { path, .. } => path,
        }
    }

    /// Expected failures (file vanished, no access) as opposed to unexpected I/O
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            HashError::NotFound { .. } | HashError::PermissionDenied { .. }
        )
    }
}

/// Failures that terminate a scan job
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Scan root {path} disappeared before classification")]
    RootVanished { path: PathBuf },

    #[error("Scan worker panicked: {0}")]
    Panicked(String),

    #[error("Scan was cancelled")]
    Cancelled,
}

impl From<ScanError> for JobError {
    fn from(error: ScanError) -> Self {
        JobError::Discovery(error.to_string())
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DupePixError>;
