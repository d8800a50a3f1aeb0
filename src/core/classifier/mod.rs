//! # Classifier Module
//!
//! Turns hashed records into a duplicate report.
//!
//! ## How It Works
//! 1. Group records by digest (first-seen order, insertion order within a group)
//! 2. In each group, the lexicographically smallest path is the original
//! 3. Every other member becomes a [`DuplicateRecord`] pointing at the original
//!
//! ## Storage statistics
//! | Field | Counts |
//! |-------|--------|
//! | `total_storage_consumed_bytes` | every member of every group with 2+ members |
//! | `reclaimable_bytes` | only the non-original members of those groups |

mod grouper;

pub use grouper::{classify, classify_at, DigestGroups};

use crate::core::hasher::PhotoRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A redundant copy and the original it duplicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    #[serde(flatten)]
    pub record: PhotoRecord,
    pub original_path: PathBuf,
}

/// Aggregate statistics for one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// When classification finished
    pub timestamp: DateTime<Utc>,
    /// Records that were hashed successfully
    pub total_files_processed: usize,
    /// Distinct digests, singletons included
    pub unique_content_count: usize,
    /// Records that are not the original of their group
    pub duplicate_count: usize,
    /// Bytes held by all members of groups with more than one member
    pub total_storage_consumed_bytes: u64,
    /// Bytes freed by deleting every duplicate but keeping the originals
    pub reclaimable_bytes: u64,
}

/// Final output of a scan job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub duplicates: Vec<DuplicateRecord>,
}

impl ScanReport {
    /// Duplicates of one original, in report order
    pub fn duplicates_of<'a>(
        &'a self,
        original: &'a std::path::Path,
    ) -> impl Iterator<Item = &'a DuplicateRecord> + 'a {
        self.duplicates
            .iter()
            .filter(move |d| d.original_path.as_path() == original)
    }

    /// Copy of this report with the timestamp zeroed, for comparing runs
    pub fn without_timestamp(&self) -> Self {
        let mut report = self.clone();
        report.summary.timestamp = DateTime::<Utc>::default();
        report
    }
}
