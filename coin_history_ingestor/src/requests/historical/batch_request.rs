//! Date-range scheduling.
//!
//! ## Sequential
//! One job at a time in date order, sleeping the request delay between jobs.
//!
//! ## Concurrent
//! Dates are cut into batches of `concurrency`. Within a batch every job is spawned
//! without waiting for the previous one, each task holding a permit from a FIFO
//! semaphore of the same size, and the request delay is slept between spawns unless
//! the run is unthrottled. A batch is fully joined before the next one starts.

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::{
    models::{
        job::{FetchJob, jobs_for_range},
        summary::RunSummary,
    },
    requests::historical::{JobRunner, RunAccumulator},
};

/// How the jobs of a range are dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    Sequential,
    Concurrent {
        /// Skip the request delay between spawns within a batch.
        unthrottled: bool,
    },
}

pub struct BatchScheduler {
    runner: Arc<JobRunner>,
    request_delay: Duration,
    concurrency: NonZeroUsize,
}

impl BatchScheduler {
    pub fn new(runner: Arc<JobRunner>, request_delay: Duration, concurrency: NonZeroUsize) -> Self {
        Self {
            runner,
            request_delay,
            concurrency,
        }
    }

    /// Fetches a single day. Same as a one-day sequential range.
    pub async fn run_single(&self, coin: &str, date: NaiveDate) -> RunSummary {
        self.run_range(coin, date, date, DispatchMode::Sequential).await
    }

    /// Fetches every day in `[start, end]` and reports the run's summary.
    ///
    /// Every job is attempted; failures are counted, never propagated.
    pub async fn run_range(
        &self,
        coin: &str,
        start: NaiveDate,
        end: NaiveDate,
        mode: DispatchMode,
    ) -> RunSummary {
        let jobs = jobs_for_range(coin, start, end);
        let accumulator = Arc::new(RunAccumulator::new());
        info!(
            coin,
            %start,
            %end,
            jobs = jobs.len(),
            ?mode,
            load_to_db = self.runner.loads_to_store(),
            "starting run"
        );

        match mode {
            DispatchMode::Sequential => self.run_sequential(&jobs, &accumulator).await,
            DispatchMode::Concurrent { unthrottled } => {
                self.run_concurrent(&jobs, unthrottled, &accumulator).await
            }
        }

        let summary = accumulator.summary();
        info!(
            successes = summary.success_count,
            errors = summary.error_count,
            "run finished"
        );
        summary
    }

    async fn run_sequential(&self, jobs: &[FetchJob], accumulator: &RunAccumulator) {
        for (i, job) in jobs.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.request_delay).await;
            }
            self.runner.run(job, accumulator).await;
        }
    }

    async fn run_concurrent(
        &self,
        jobs: &[FetchJob],
        unthrottled: bool,
        accumulator: &Arc<RunAccumulator>,
    ) {
        let limit = self.concurrency.get();
        let semaphore = Arc::new(Semaphore::new(limit));
        let total = jobs.len();
        let mut processed = 0;

        for batch in jobs.chunks(limit) {
            let mut in_flight = Vec::with_capacity(batch.len());

            for (i, job) in batch.iter().enumerate() {
                if i > 0 && !unthrottled {
                    tokio::time::sleep(self.request_delay).await;
                }

                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        // Only happens if the semaphore is closed, which this scheduler never does.
                        error!(job = %job, error = %e, "could not admit job");
                        accumulator.record_error(job);
                        continue;
                    }
                };

                let runner = Arc::clone(&self.runner);
                let acc = Arc::clone(accumulator);
                let owned = job.clone();
                let handle = tokio::spawn(async move {
                    let _permit = permit;
                    runner.run(&owned, &acc).await;
                });
                in_flight.push((job, handle));
            }

            for (job, handle) in in_flight {
                if let Err(e) = handle.await {
                    error!(job = %job, error = %e, "fetch task aborted");
                    accumulator.record_error(job);
                }
            }

            processed += batch.len();
            info!("Progress: {processed}/{total} dates processed");
        }
    }
}
