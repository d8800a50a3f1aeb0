//! Job status, snapshots, and the lock that guards them.

use super::JobId;
use crate::core::classifier::ScanReport;
use crate::error::{DupePixError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Where a job is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Scanning,
    Complete,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scanning => "scanning",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Complete and error are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of a job's state
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub root: PathBuf,
    pub status: JobStatus,
    /// Files attempted so far, hashed or skipped
    pub processed: usize,
    /// Files found by discovery (0 until discovery finishes)
    pub total: usize,
    /// Files that could not be read
    pub skipped: usize,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Present once the job is complete
    #[serde(skip)]
    pub report: Option<Arc<ScanReport>>,
}

impl JobSnapshot {
    pub(crate) fn pending(id: JobId, root: PathBuf) -> Self {
        Self {
            id,
            root,
            status: JobStatus::Pending,
            processed: 0,
            total: 0,
            skipped: 0,
            message: "Queued".to_string(),
            created_at: Utc::now(),
            finished_at: None,
            report: None,
        }
    }

    /// The fields a polling client needs
    pub fn status_view(&self) -> JobStatusView {
        JobStatusView {
            status: self.status,
            processed: self.processed,
            total: self.total,
            skipped: self.skipped,
            message: self.message.clone(),
        }
    }
}

/// Status returned by `poll_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusView {
    pub status: JobStatus,
    pub processed: usize,
    pub total: usize,
    pub skipped: usize,
    pub message: String,
}

/// Shared, lock-guarded job state.
///
/// Readers clone the whole snapshot under the read lock, so they never see half
/// of an update. Writes after a terminal status are dropped.
#[derive(Debug)]
pub(crate) struct JobCell {
    state: RwLock<JobSnapshot>,
}

impl JobCell {
    pub(crate) fn new(snapshot: JobSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub(crate) fn snapshot(&self) -> Result<JobSnapshot> {
        self.state
            .read()
            .map(|state| state.clone())
            .map_err(|_| DupePixError::Poisoned)
    }

    /// Apply `f` unless the job already finished. Returns whether it was applied.
    pub(crate) fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut JobSnapshot),
    {
        // Every update rewrites whole fields, so a poisoned guard is still consistent
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.status.is_terminal() {
            return false;
        }

        let processed_before = state.processed;
        f(&mut state);
        debug_assert!(state.processed >= processed_before);
        true
    }

    pub(crate) fn complete(&self, report: ScanReport) -> bool {
        self.update(|state| {
            state.status = JobStatus::Complete;
            state.processed = state.total;
            state.message = format!(
                "Processed {} files, found {} duplicates",
                report.summary.total_files_processed, report.summary.duplicate_count
            );
            state.finished_at = Some(Utc::now());
            state.report = Some(Arc::new(report));
        })
    }

    pub(crate) fn fail(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update(|state| {
            state.status = JobStatus::Error;
            state.message = message;
            state.finished_at = Some(Utc::now());
        })
    }
}
