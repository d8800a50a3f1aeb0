//! Event type definitions for scan jobs.

use crate::core::classifier::ScanSummary;
use crate::core::job::JobId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a running scan job reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanEvent {
    /// The worker thread picked the job up
    Started { id: JobId, root: PathBuf },
    /// Discovery finished enumerating candidates
    Discovered { id: JobId, total: usize },
    /// Coalesced hashing progress
    Progress(ProgressUpdate),
    /// A file could not be hashed and was left out of the report
    FileSkipped {
        id: JobId,
        path: PathBuf,
        message: String,
    },
    /// Classification finished
    Completed { id: JobId, summary: ScanSummary },
    /// The job ended in the error state
    Failed { id: JobId, message: String },
}

impl ScanEvent {
    /// Id of the job that emitted this event
    pub fn job_id(&self) -> JobId {
        match self {
            ScanEvent::Started { id, .. }
            | ScanEvent::Discovered { id, .. }
            | ScanEvent::FileSkipped { id, .. }
            | ScanEvent::Completed { id, .. }
            | ScanEvent::Failed { id, .. } => *id,
            ScanEvent::Progress(update) => update.id,
        }
    }

    /// Whether this is the last event a job will send
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEvent::Completed { .. } | ScanEvent::Failed { .. })
    }
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub id: JobId,
    /// Files attempted so far, hashed or skipped
    pub processed: usize,
    /// Files found by discovery
    pub total: usize,
    /// Files skipped because they could not be read
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let id = JobId::new();
        let event = ScanEvent::Progress(ProgressUpdate {
            id,
            processed: 50,
            total: 120,
            skipped: 1,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"progress\""));

        let deserialized: ScanEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            ScanEvent::Progress(p) => {
                assert_eq!(p.processed, 50);
                assert_eq!(p.id, id);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        let id = JobId::new();
        assert!(ScanEvent::Failed {
            id,
            message: "boom".to_string()
        }
        .is_terminal());
        assert!(!ScanEvent::Discovered { id, total: 3 }.is_terminal());
        assert_eq!(ScanEvent::Discovered { id, total: 3 }.job_id(), id);
    }
}
