//! Scan job execution.

use super::{CancellationToken, JobCell, JobId, JobStatus};
use crate::core::classifier::{classify, ScanReport};
use crate::core::hasher::{FileHasher, DEFAULT_CHUNK_SIZE};
use crate::core::scanner::{ScanConfig, WalkDirScanner};
use crate::error::JobError;
use crate::events::{EventSender, ProgressUpdate, ScanEvent};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};

/// Configuration shared by every job a registry starts
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Scanner configuration
    pub scan: ScanConfig,
    /// Publish progress at least every this many files
    pub progress_interval: usize,
    /// ...or once this much time has passed since the last publish
    pub progress_min_interval: Duration,
    /// Read buffer size for the default content hasher
    pub chunk_size: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            progress_interval: 50,
            progress_min_interval: Duration::from_millis(100),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Decides when a progress snapshot is worth publishing
struct ProgressThrottle {
    every: usize,
    min_interval: Duration,
    last_processed: usize,
    last_at: Instant,
}

impl ProgressThrottle {
    fn new(every: usize, min_interval: Duration) -> Self {
        Self {
            every: every.max(1),
            min_interval,
            last_processed: 0,
            last_at: Instant::now(),
        }
    }

    fn due(&mut self, processed: usize, total: usize) -> bool {
        let now = Instant::now();
        let due = processed == total
            || processed - self.last_processed >= self.every
            || now.duration_since(self.last_at) >= self.min_interval;

        if due {
            self.last_processed = processed;
            self.last_at = now;
        }
        due
    }
}

/// A single scan, executed on whichever thread calls [`ScanJob::run`].
///
/// The registry builds one per submitted root and runs it on a dedicated thread.
pub struct ScanJob {
    id: JobId,
    root: PathBuf,
    scanner: WalkDirScanner,
    hasher: Arc<dyn FileHasher>,
    progress_interval: usize,
    progress_min_interval: Duration,
    cell: Arc<JobCell>,
    cancel: CancellationToken,
    events: Option<EventSender>,
}

impl ScanJob {
    pub(crate) fn new(
        id: JobId,
        root: PathBuf,
        config: &JobConfig,
        hasher: Arc<dyn FileHasher>,
        cell: Arc<JobCell>,
        cancel: CancellationToken,
        events: Option<EventSender>,
    ) -> Self {
        Self {
            id,
            root,
            scanner: WalkDirScanner::new(config.scan.clone()),
            hasher,
            progress_interval: config.progress_interval,
            progress_min_interval: config.progress_min_interval,
            cell,
            cancel,
            events,
        }
    }

    /// Run the pipeline to a terminal state.
    ///
    /// Never panics: a panic inside the pipeline ends the job in `error`.
    pub fn run(self) {
        let span = info_span!("scan_job", id = %self.id);
        let _guard = span.enter();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute()))
            .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload))));

        match outcome {
            Ok(report) => {
                let summary = report.summary.clone();
                self.cell.complete(report);
                info!(
                    files = summary.total_files_processed,
                    duplicates = summary.duplicate_count,
                    "Scan complete"
                );
                self.emit(ScanEvent::Completed {
                    id: self.id,
                    summary,
                });
            }
            Err(e) => {
                if e == JobError::Cancelled {
                    info!("Scan cancelled");
                } else {
                    error!("Scan failed: {}", e);
                }
                self.cell.fail(e.to_string());
                self.emit(ScanEvent::Failed {
                    id: self.id,
                    message: e.to_string(),
                });
            }
        }
    }

    fn execute(&self) -> Result<ScanReport, JobError> {
        self.cell.update(|state| {
            state.status = JobStatus::Scanning;
            state.message = "Discovering files".to_string();
        });
        info!(root = %self.root.display(), hasher = self.hasher.name(), "Scan started");
        self.emit(ScanEvent::Started {
            id: self.id,
            root: self.root.clone(),
        });

        // Phase 1: discovery, eager so that `total` is known before hashing
        let mut candidates = Vec::new();
        let mut discovery = self.scanner.discover(&self.root)?;
        for path in discovery.by_ref() {
            self.check_cancelled()?;
            candidates.push(path?);
        }
        if discovery.skipped_entries() > 0 {
            warn!(
                "{} unreadable entries skipped during discovery",
                discovery.skipped_entries()
            );
        }

        let total = candidates.len();
        self.cell.update(|state| {
            state.total = total;
            state.message = format!("Hashing {} files", total);
        });
        debug!(total, "Discovery finished");
        self.emit(ScanEvent::Discovered { id: self.id, total });

        // Phase 2: hashing
        let mut records = Vec::with_capacity(total);
        let mut skipped = 0;
        let mut throttle = ProgressThrottle::new(self.progress_interval, self.progress_min_interval);

        for (index, path) in candidates.iter().enumerate() {
            self.check_cancelled()?;

            match self.hasher.hash_file(path) {
                Ok(record) => {
                    debug!(path = %path.display(), digest = %record.digest, "Hashed");
                    records.push(record);
                }
                Err(e) => {
                    if e.is_expected() {
                        warn!("Skipping {}", e);
                    } else {
                        error!("Unexpected error hashing {}", e);
                    }
                    skipped += 1;
                    self.emit(ScanEvent::FileSkipped {
                        id: self.id,
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }

            let processed = index + 1;
            if throttle.due(processed, total) {
                self.cell.update(|state| {
                    state.processed = processed;
                    state.skipped = skipped;
                });
                self.emit(ScanEvent::Progress(ProgressUpdate {
                    id: self.id,
                    processed,
                    total,
                    skipped,
                }));
            }
        }

        // Phase 3: classification
        if !self.root.is_dir() {
            return Err(JobError::RootVanished {
                path: self.root.clone(),
            });
        }
        self.cell.update(|state| state.message = "Classifying".to_string());

        Ok(classify(records))
    }

    fn check_cancelled(&self) -> Result<(), JobError> {
        if self.cancel.is_cancelled() {
            Err(JobError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(ref sender) = self.events {
            sender.send(event);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::{ContentHasher, PhotoRecord};
    use crate::core::job::JobSnapshot;
    use crate::error::HashError;
    use crate::events::EventChannel;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn job_for(root: &Path, hasher: Arc<dyn FileHasher>) -> (ScanJob, Arc<JobCell>, CancellationToken) {
        let id = JobId::new();
        let cell = Arc::new(JobCell::new(JobSnapshot::pending(id, root.to_path_buf())));
        let cancel = CancellationToken::new();
        let job = ScanJob::new(
            id,
            root.to_path_buf(),
            &JobConfig::default(),
            hasher,
            cell.clone(),
            cancel.clone(),
            None,
        );
        (job, cell, cancel)
    }

    struct PanickingHasher;

    impl FileHasher for PanickingHasher {
        fn hash_file(&self, _path: &Path) -> Result<PhotoRecord, HashError> {
            panic!("hasher exploded");
        }
    }

    #[test]
    fn throttle_publishes_on_interval_and_at_end() {
        let mut throttle = ProgressThrottle::new(3, Duration::from_secs(3600));
        let published: Vec<usize> = (1..=7).filter(|&p| throttle.due(p, 7)).collect();
        assert_eq!(published, vec![3, 6, 7]);
    }

    #[test]
    fn run_completes_with_report() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"abc").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), b"abc").unwrap();

        let (job, cell, _) = job_for(temp_dir.path(), Arc::new(ContentHasher::new()));
        job.run();

        let snapshot = cell.snapshot().unwrap();
        assert_eq!(snapshot.status, JobStatus::Complete);
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.total, 2);
        let report = snapshot.report.unwrap();
        assert_eq!(report.summary.duplicate_count, 1);
    }

    #[test]
    fn cancelled_before_start_ends_in_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"abc").unwrap();

        let (job, cell, cancel) = job_for(temp_dir.path(), Arc::new(ContentHasher::new()));
        cancel.cancel();
        job.run();

        let snapshot = cell.snapshot().unwrap();
        assert_eq!(snapshot.status, JobStatus::Error);
        assert_eq!(snapshot.message, "Scan was cancelled");
        assert!(snapshot.report.is_none());
    }

    #[test]
    fn panicking_hasher_ends_in_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"abc").unwrap();

        let (job, cell, _) = job_for(temp_dir.path(), Arc::new(PanickingHasher));
        job.run();

        let snapshot = cell.snapshot().unwrap();
        assert_eq!(snapshot.status, JobStatus::Error);
        assert!(snapshot.message.contains("hasher exploded"));
    }

    #[test]
    fn missing_root_ends_in_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("gone");

        let (job, cell, _) = job_for(&root, Arc::new(ContentHasher::new()));
        job.run();

        let snapshot = cell.snapshot().unwrap();
        assert_eq!(snapshot.status, JobStatus::Error);
        assert!(snapshot.message.contains("Discovery failed"));
    }

    #[test]
    fn events_end_with_completed() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.png"), b"xyz").unwrap();

        let id = JobId::new();
        let cell = Arc::new(JobCell::new(JobSnapshot::pending(id, temp_dir.path().into())));
        let (sender, receiver) = EventChannel::new();
        let job = ScanJob::new(
            id,
            temp_dir.path().to_path_buf(),
            &JobConfig::default(),
            Arc::new(ContentHasher::new()),
            cell,
            CancellationToken::new(),
            Some(sender),
        );
        job.run();

        let events: Vec<ScanEvent> = receiver.iter().collect();
        assert!(matches!(events.first(), Some(ScanEvent::Started { .. })));
        assert!(matches!(events.last(), Some(ScanEvent::Completed { .. })));
        assert!(events.iter().all(|e| e.job_id() == id));
    }
}
