use std::{path::PathBuf, sync::Arc};

use coin_store::DayWrite;
use snafu::ResultExt;
use tracing::error;

use crate::{
    errors::{FetchSnafu, JobError, LoadStoreSnafu, SaveFileSnafu},
    io::{file::JsonFileSink, sink::PayloadSink, store::StoreSink},
    models::job::FetchJob,
    providers::HistoryProvider,
    requests::historical::RunAccumulator,
};

/// What a successful job produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobOutcome {
    pub file: PathBuf,
    /// `None` when the run does not load into the store.
    pub stored: Option<DayWrite>,
}

/// Runs one job end to end: fetch, save the file, optionally load the store.
pub struct JobRunner {
    provider: Arc<dyn HistoryProvider>,
    files: JsonFileSink,
    store: Option<StoreSink>,
}

impl JobRunner {
    pub fn new(provider: Arc<dyn HistoryProvider>, files: JsonFileSink) -> Self {
        Self {
            provider,
            files,
            store: None,
        }
    }

    /// Also load every fetched payload into `store`.
    pub fn with_store(mut self, store: StoreSink) -> Self {
        self.store = Some(store);
        self
    }

    pub fn loads_to_store(&self) -> bool {
        self.store.is_some()
    }

    /// Runs `job` and propagates the first failure.
    pub async fn try_run(&self, job: &FetchJob) -> Result<JobOutcome, JobError> {
        let payload = self.provider.fetch_history(job).await.context(FetchSnafu)?;

        let file = self.files.write(job, &payload).await.context(SaveFileSnafu)?;

        let stored = match &self.store {
            Some(store) => Some(store.write(job, &payload).await.context(LoadStoreSnafu)?),
            None => None,
        };

        Ok(JobOutcome { file, stored })
    }

    /// Runs `job` and records the result in `accumulator`.
    ///
    /// Failures are logged and recorded here; they never reach the caller.
    pub async fn run(&self, job: &FetchJob, accumulator: &RunAccumulator) -> Option<JobOutcome> {
        match self.try_run(job).await {
            Ok(outcome) => {
                accumulator.record_success();
                Some(outcome)
            }
            Err(e) => {
                error!(coin = job.coin(), date = %job.date(), error = %e, "job failed");
                accumulator.record_error(job);
                None
            }
        }
    }
}
