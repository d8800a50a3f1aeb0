//! # Job Module
//!
//! One background run of the discover → hash → classify pipeline.
//!
//! ## Lifecycle
//! ```text
//! pending ──> scanning ──> complete
//!                 └──────> error   (discovery failure, cancellation, panic)
//! ```
//! A job's state is written only by its own worker thread and read through
//! [`JobSnapshot`]s. Once a terminal status is written the state is frozen.
//!
//! Jobs are normally created and driven through the
//! [`JobRegistry`](crate::core::registry::JobRegistry).

mod cancel;
mod executor;
mod state;

pub use cancel::CancellationToken;
pub use executor::{JobConfig, ScanJob};
pub use state::{JobSnapshot, JobStatus, JobStatusView};

pub(crate) use state::JobCell;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque scan job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// A fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(JobId)
    }
}

impl From<Uuid> for JobId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn job_id_parses_its_display_form() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-job".parse::<JobId>().is_err());
    }

    #[test]
    fn job_id_serializes_as_plain_string() {
        let id = JobId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
