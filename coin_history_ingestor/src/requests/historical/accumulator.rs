use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use crate::models::{job::FetchJob, summary::RunSummary};

/// Success/error accounting for one run, shared by every in-flight job.
///
/// The error counter is only bumped while the failure list is locked, so the
/// count and the list always agree.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    successes: AtomicUsize,
    errors: AtomicUsize,
    failed: Mutex<Vec<FetchJob>>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, job: &FetchJob) {
        let mut failed = self.failed.lock().unwrap_or_else(PoisonError::into_inner);
        failed.push(job.clone());
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the counts and the failures recorded so far.
    pub fn summary(&self) -> RunSummary {
        let failed = self.failed.lock().unwrap_or_else(PoisonError::into_inner);
        RunSummary {
            success_count: self.successes.load(Ordering::Relaxed),
            error_count: self.errors.load(Ordering::Relaxed),
            failed_jobs: failed.clone(),
        }
    }
}
