//! Running fetch jobs: one at a time ([`JobRunner`]) or over a date range
//! ([`BatchScheduler`]), with per-run accounting in [`RunAccumulator`].

mod accumulator;
pub use accumulator::RunAccumulator;

mod single_request;
pub use single_request::{JobOutcome, JobRunner};

mod batch_request;
pub use batch_request::{BatchScheduler, DispatchMode};
