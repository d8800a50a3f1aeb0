//! # Core Module
//!
//! The scan engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Discovers candidate image files under a root
//! - `hasher` - Computes content digests
//! - `classifier` - Groups digests and picks originals
//! - `job` - Runs one scan and tracks its progress
//! - `registry` - Owns all jobs; entry point for submit/poll/fetch
//! - `reporter` - Saves hash lists and reports as JSON

pub mod classifier;
pub mod hasher;
pub mod job;
pub mod registry;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use classifier::{DuplicateRecord, ScanReport, ScanSummary};
pub use hasher::{ContentHasher, FileHasher, PhotoRecord};
pub use job::{JobConfig, JobId, JobSnapshot, JobStatus, JobStatusView};
pub use registry::{JobRegistry, JobRegistryBuilder};
pub use scanner::{ScanConfig, WalkDirScanner};
