use snafu::Snafu;

use crate::{io::sink::SinkError, providers::FetchError};

/// Why a single job failed. Caught at the job boundary; never aborts a run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum JobError {
    /// The upstream fetch failed after all retries.
    #[snafu(display("Error obtaining data: {source}"))]
    Fetch {
        #[snafu(backtrace)]
        source: FetchError,
    },

    /// The payload could not be written to its JSON file.
    #[snafu(display("Error saving payload to file: {source}"))]
    SaveFile {
        #[snafu(backtrace)]
        source: SinkError,
    },

    /// The payload could not be loaded into the store.
    #[snafu(display("Error loading payload into the store: {source}"))]
    LoadStore {
        #[snafu(backtrace)]
        source: SinkError,
    },
}
