//! Process-wide table of scan jobs.
//!
//! The registry is the only state shared between callers. Its map is guarded by
//! a `RwLock`; each job's progress lives behind its own lock and is written only
//! by that job's worker thread.

use crate::core::classifier::ScanReport;
use crate::core::hasher::{ContentHasher, FileHasher};
use crate::core::job::{
    CancellationToken, JobCell, JobConfig, JobId, JobSnapshot, JobStatus, JobStatusView, ScanJob,
};
use crate::core::scanner::{validate_root, ScanConfig};
use crate::error::{DupePixError, JobError, Result};
use crate::events::EventSender;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// One registered job and the handles needed to control it
struct JobEntry {
    cell: Arc<JobCell>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    started: Mutex<bool>,
}

/// Builder for [`JobRegistry`]
pub struct JobRegistryBuilder {
    config: JobConfig,
    hasher: Option<Arc<dyn FileHasher>>,
    events: Option<EventSender>,
}

impl JobRegistryBuilder {
    pub fn new() -> Self {
        Self {
            config: JobConfig::default(),
            hasher: None,
            events: None,
        }
    }

    /// Replace the whole job configuration
    pub fn config(mut self, config: JobConfig) -> Self {
        self.config = config;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan = config;
        self
    }

    /// Publish progress at least every `files` files
    pub fn progress_interval(mut self, files: usize) -> Self {
        self.config.progress_interval = files;
        self
    }

    /// Use a custom hasher instead of the streaming BLAKE3 one
    pub fn hasher(mut self, hasher: Arc<dyn FileHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Push job events to this sender
    pub fn events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn build(self) -> JobRegistry {
        let hasher = self.hasher.unwrap_or_else(|| {
            Arc::new(ContentHasher::new().chunk_size(self.config.chunk_size))
        });

        JobRegistry {
            jobs: RwLock::new(HashMap::new()),
            config: self.config,
            hasher,
            events: self.events,
        }
    }
}

impl Default for JobRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps job ids to running or finished scans.
///
/// Finished jobs stay registered until [`remove`](Self::remove) or
/// [`prune_finished`](Self::prune_finished) is called.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<JobEntry>>>,
    config: JobConfig,
    hasher: Arc<dyn FileHasher>,
    events: Option<EventSender>,
}

impl JobRegistry {
    /// Registry with default configuration
    pub fn new() -> Self {
        JobRegistryBuilder::new().build()
    }

    pub fn builder() -> JobRegistryBuilder {
        JobRegistryBuilder::new()
    }

    /// Validate `root` and start scanning it in the background.
    ///
    /// Returns as soon as the worker thread is spawned.
    pub fn submit_scan(&self, root: impl AsRef<Path>) -> Result<JobId> {
        let id = self.create(root)?;
        if let Err(e) = self.start(id) {
            self.jobs.write().map_err(|_| DupePixError::Poisoned)?.remove(&id);
            return Err(e);
        }
        Ok(id)
    }

    /// Register a pending job for `root` without starting it
    pub fn create(&self, root: impl AsRef<Path>) -> Result<JobId> {
        let root = root.as_ref();
        validate_root(root).map_err(|e| DupePixError::invalid_input(root, e.to_string()))?;

        let id = JobId::new();
        let entry = Arc::new(JobEntry {
            cell: Arc::new(JobCell::new(JobSnapshot::pending(id, root.to_path_buf()))),
            cancel: CancellationToken::new(),
            worker: Mutex::new(None),
            started: Mutex::new(false),
        });

        self.jobs
            .write()
            .map_err(|_| DupePixError::Poisoned)?
            .insert(id, entry);

        debug!(%id, root = %root.display(), "Job created");
        Ok(id)
    }

    /// Spawn the worker for a pending job. Returns `false` if it was already started.
    pub fn start(&self, id: JobId) -> Result<bool> {
        let entry = self.entry(id)?;

        let mut started = entry.started.lock().map_err(|_| DupePixError::Poisoned)?;
        if *started {
            return Ok(false);
        }

        let root = entry.cell.snapshot()?.root;
        let job = ScanJob::new(
            id,
            root,
            &self.config,
            Arc::clone(&self.hasher),
            Arc::clone(&entry.cell),
            entry.cancel.clone(),
            self.events.clone(),
        );

        let handle = thread::Builder::new()
            .name(format!("scan-{}", id))
            .spawn(move || job.run())
            .map_err(DupePixError::Spawn)?;

        *entry.worker.lock().map_err(|_| DupePixError::Poisoned)? = Some(handle);
        *started = true;

        info!(%id, "Job started");
        Ok(true)
    }

    /// Current snapshot of a job, report included once complete
    pub fn get(&self, id: JobId) -> Result<JobSnapshot> {
        self.entry(id)?.cell.snapshot()
    }

    pub fn poll_status(&self, id: JobId) -> Result<JobStatusView> {
        Ok(self.get(id)?.status_view())
    }

    /// The finished report, or `NotReady` while the job is still running or failed
    pub fn fetch_report(&self, id: JobId) -> Result<Arc<ScanReport>> {
        let snapshot = self.get(id)?;
        match (snapshot.status, snapshot.report) {
            (JobStatus::Complete, Some(report)) => Ok(report),
            (status, _) => Err(DupePixError::NotReady { id, status }),
        }
    }

    /// Ask a job to stop. Returns `false` if it had already finished.
    pub fn cancel(&self, id: JobId) -> Result<bool> {
        let entry = self.entry(id)?;
        let snapshot = entry.cell.snapshot()?;
        if snapshot.status.is_terminal() {
            return Ok(false);
        }

        entry.cancel.cancel();

        // A job that never started has no worker to notice the flag
        let started = *entry.started.lock().map_err(|_| DupePixError::Poisoned)?;
        if !started {
            entry.cell.fail(JobError::Cancelled.to_string());
        }

        info!(%id, "Cancellation requested");
        Ok(true)
    }

    /// Block until the job's worker exits, then return the final snapshot.
    ///
    /// A job that was created but never started, or one another caller is already
    /// waiting on, is returned as-is.
    pub fn wait(&self, id: JobId) -> Result<JobSnapshot> {
        let entry = self.entry(id)?;
        let handle = entry
            .worker
            .lock()
            .map_err(|_| DupePixError::Poisoned)?
            .take();

        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(%id, "Scan worker exited abnormally");
                entry.cell.fail("Scan worker exited abnormally");
            }
        }

        entry.cell.snapshot()
    }

    /// Drop a job from the registry, cancelling it if still running
    pub fn remove(&self, id: JobId) -> Result<JobSnapshot> {
        let entry = self
            .jobs
            .write()
            .map_err(|_| DupePixError::Poisoned)?
            .remove(&id)
            .ok_or(DupePixError::NotFound { id })?;

        entry.cancel.cancel();
        entry.cell.snapshot()
    }

    /// Remove finished jobs whose completion is at least `older_than` ago.
    ///
    /// Returns how many jobs were removed.
    pub fn prune_finished(&self, older_than: Duration) -> Result<usize> {
        let now = Utc::now();
        let mut jobs = self.jobs.write().map_err(|_| DupePixError::Poisoned)?;

        let before = jobs.len();
        jobs.retain(|_, entry| {
            let Ok(snapshot) = entry.cell.snapshot() else {
                return true;
            };
            match snapshot.finished_at {
                Some(finished) if snapshot.status.is_terminal() => {
                    let age = now
                        .signed_duration_since(finished)
                        .to_std()
                        .unwrap_or_default();
                    age < older_than
                }
                _ => true,
            }
        });

        let removed = before - jobs.len();
        if removed > 0 {
            debug!(removed, "Pruned finished jobs");
        }
        Ok(removed)
    }

    /// Ids of every registered job
    pub fn job_ids(&self) -> Result<Vec<JobId>> {
        Ok(self
            .jobs
            .read()
            .map_err(|_| DupePixError::Poisoned)?
            .keys()
            .copied()
            .collect())
    }

    pub fn len(&self) -> usize {
        self.jobs.read().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: JobId) -> Result<Arc<JobEntry>> {
        self.jobs
            .read()
            .map_err(|_| DupePixError::Poisoned)?
            .get(&id)
            .cloned()
            .ok_or(DupePixError::NotFound { id })
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn submit_scan_rejects_missing_root() {
        let registry = JobRegistry::new();
        let result = registry.submit_scan("/nonexistent/path/12345");

        assert!(matches!(result, Err(DupePixError::InvalidInput { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn submit_scan_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, b"abc").unwrap();

        let registry = JobRegistry::new();
        assert!(matches!(
            registry.submit_scan(&file),
            Err(DupePixError::InvalidInput { .. })
        ));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = JobRegistry::new();
        let id = JobId::new();

        assert!(matches!(registry.get(id), Err(DupePixError::NotFound { .. })));
        assert!(matches!(
            registry.poll_status(id),
            Err(DupePixError::NotFound { .. })
        ));
        assert!(matches!(
            registry.fetch_report(id),
            Err(DupePixError::NotFound { .. })
        ));
    }

    #[test]
    fn created_job_stays_pending_until_started() {
        let temp_dir = TempDir::new().unwrap();
        let registry = JobRegistry::new();

        let id = registry.create(temp_dir.path()).unwrap();
        assert_eq!(registry.poll_status(id).unwrap().status, JobStatus::Pending);
        assert!(matches!(
            registry.fetch_report(id),
            Err(DupePixError::NotReady {
                status: JobStatus::Pending,
                ..
            })
        ));

        assert!(registry.start(id).unwrap());
        assert!(!registry.start(id).unwrap());

        let snapshot = registry.wait(id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Complete);
        assert!(registry.fetch_report(id).is_ok());
    }

    #[test]
    fn cancelling_unstarted_job_fails_it() {
        let temp_dir = TempDir::new().unwrap();
        let registry = JobRegistry::new();
        let id = registry.create(temp_dir.path()).unwrap();

        assert!(registry.cancel(id).unwrap());

        let status = registry.poll_status(id).unwrap();
        assert_eq!(status.status, JobStatus::Error);
        assert_eq!(status.message, "Scan was cancelled");
        assert!(!registry.cancel(id).unwrap());
    }

    #[test]
    fn prune_removes_only_finished_jobs() {
        let temp_dir = TempDir::new().unwrap();
        let registry = JobRegistry::new();

        let finished = registry.submit_scan(temp_dir.path()).unwrap();
        registry.wait(finished).unwrap();
        let pending = registry.create(temp_dir.path()).unwrap();

        // Too recent
        assert_eq!(registry.prune_finished(Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(registry.prune_finished(Duration::ZERO).unwrap(), 1);

        assert_eq!(registry.job_ids().unwrap(), vec![pending]);
        assert!(matches!(
            registry.get(finished),
            Err(DupePixError::NotFound { .. })
        ));
    }

    #[test]
    fn remove_returns_last_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let registry = JobRegistry::new();
        let id = registry.submit_scan(temp_dir.path()).unwrap();
        registry.wait(id).unwrap();

        let snapshot = registry.remove(id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Complete);
        assert!(registry.is_empty());
        assert!(matches!(registry.remove(id), Err(DupePixError::NotFound { .. })));
    }
}
