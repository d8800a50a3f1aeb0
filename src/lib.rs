//! # DupePix
//!
//! Finds byte-identical image files under a directory tree.
//!
//! ## Core Philosophy
//! - **Never delete** - the report only points duplicates at their originals
//! - **Deterministic** - the same tree always yields the same report
//! - **Non-blocking** - scans run in the background and are polled by id
//!
//! ## Architecture
//! - `core` - Discovery, hashing, classification, and the job registry
//! - `events` - Optional push notifications for job progress
//! - `error` - Error types
//!
//! ## Example
//! ```rust,ignore
//! use dupepix::JobRegistry;
//!
//! let registry = JobRegistry::new();
//! let id = registry.submit_scan("/photos")?;
//! registry.wait(id)?;
//! let report = registry.fetch_report(id)?;
//! println!("{} duplicates", report.summary.duplicate_count);
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::{JobId, JobRegistry, JobStatus, ScanReport};
pub use error::{DupePixError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` controls
/// verbosity; calling it twice is a no-op.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
