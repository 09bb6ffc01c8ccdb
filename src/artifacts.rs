//! Artifact lifecycle management
//!
//! Every generated WAV file is registered here and removed by the next
//! sweep, either the periodic one or an explicit cleanup request.

use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default interval between periodic sweeps
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Files deleted
    pub removed: usize,
    /// Files already gone
    pub missing: usize,
    /// Files that could not be deleted (no longer tracked)
    pub failed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.removed + self.missing + self.failed
    }
}

/// Tracked set of generated artifact paths
#[derive(Debug, Default)]
pub struct ArtifactTracker {
    paths: Mutex<Vec<PathBuf>>,
}

impl ArtifactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Track a path for removal by the next sweep
    ///
    /// Returns false if the path was already tracked.
    pub fn register(&self, path: &Path) -> bool {
        let mut paths = self.lock();
        if paths.iter().any(|p| p == path) {
            debug!("Artifact already tracked: {}", path.display());
            return false;
        }
        paths.push(path.to_path_buf());
        true
    }

    /// Number of tracked artifacts
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the tracked paths
    pub fn tracked(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Delete every tracked artifact and forget all of them
    ///
    /// Files that are already gone count as missing. Files that cannot be
    /// deleted are logged and dropped from tracking all the same; they are
    /// not retried.
    pub fn reclaim_all(&self) -> SweepReport {
        let paths = std::mem::take(&mut *self.lock());
        let mut report = SweepReport::default();

        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => report.missing += 1,
                Err(e) => {
                    warn!("Error removing temp file {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        if report.total() > 0 {
            info!(
                "Sweep finished: {} removed, {} already gone, {} failed",
                report.removed, report.missing, report.failed
            );
        }
        report
    }
}

/// Start the periodic sweep on the current tokio runtime
///
/// The first sweep runs one `period` after start. The task ends when
/// `shutdown` turns true or its sender is dropped.
pub fn spawn_sweeper(
    tracker: Arc<ArtifactTracker>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        debug!("Sweeper running every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let tracker = tracker.clone();
                    let sweep = tokio::task::spawn_blocking(move || tracker.reclaim_all());
                    if let Err(e) = sweep.await {
                        warn!("Periodic sweep panicked: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Sweeper stopped");
    })
}
