use std::fmt;

use crate::models::job::FetchJob;

/// Outcome of one run, read once after every job has completed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub success_count: usize,
    pub error_count: usize,
    /// Jobs that failed, in the order their failures were recorded.
    pub failed_jobs: Vec<FetchJob>,
}

impl RunSummary {
    /// Number of jobs dispatched in the run.
    pub fn total(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn all_succeeded(&self) -> bool {
        self.error_count == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successes: {}/{}", self.success_count, self.total())
    }
}
