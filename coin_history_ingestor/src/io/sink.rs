use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{job::FetchJob, payload::RawPayload};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The output directory could not be created.
    #[snafu(display("Failed to create directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// An error occurred while writing the file.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The payload could not be serialized back to JSON.
    #[snafu(display("Failed to serialize payload: {source}"))]
    Serialize {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The payload has no numeric price in the reference currency.
    #[snafu(display("Payload has no numeric market_data.current_price.{currency}"))]
    PriceMissing {
        currency: String,
        backtrace: Backtrace,
    },

    /// The relational store rejected the write.
    #[snafu(display("Store write failed: {source}"))]
    Store {
        source: coin_store::StoreError,
        backtrace: Backtrace,
    },

    /// The blocking store task panicked or was cancelled.
    #[snafu(display("Store task did not complete: {source}"))]
    TaskJoin {
        source: tokio::task::JoinError,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait PayloadSink: Send + Sync {
    /// The type of output returned after a successful write operation.
    ///
    /// This makes the trait flexible. For example:
    /// - The file sink returns the path it wrote.
    /// - The store sink returns whether the day row was new or a duplicate.
    type Output: Send;

    /// Persists the payload fetched for `job`.
    async fn write(&self, job: &FetchJob, payload: &RawPayload) -> Result<Self::Output, SinkError>;
}
