//! Provider abstraction for coin history sources.
//!
//! This module defines the [`HistoryProvider`] trait, the interface the job runner
//! uses to fetch one coin's raw history document for one day. The concrete
//! implementation for the CoinGecko-style REST API lives in [`coingecko_rest`];
//! its retry rules are in [`retry`].
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn HistoryProvider`), so tests and alternative sources can be swapped in.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use coin_history_ingestor::models::{job::FetchJob, payload::RawPayload};
//! use coin_history_ingestor::providers::{FetchError, HistoryProvider};
//!
//! struct Fixed;
//!
//! #[async_trait]
//! impl HistoryProvider for Fixed {
//!     async fn fetch_history(&self, _job: &FetchJob) -> Result<RawPayload, FetchError> {
//!         Ok(RawPayload::new(serde_json::json!({})))
//!     }
//! }
//! ```

pub mod coingecko_rest;
pub mod retry;

use async_trait::async_trait;
use reqwest::StatusCode;
use snafu::{Backtrace, Snafu};

use crate::models::{job::FetchJob, payload::RawPayload};

/// Fetches the raw history document for one (coin, date).
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetches the document for `job`, retrying transient failures internally.
    ///
    /// An `Err` is terminal: the caller must not retry.
    async fn fetch_history(&self, job: &FetchJob) -> Result<RawPayload, FetchError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The configured base URL is not an absolute http(s) URL.
    #[snafu(display("Invalid API base URL {url:?}: {message}"))]
    InvalidBaseUrl {
        url: String,
        message: String,
        backtrace: Backtrace,
    },
}

/// Terminal failure of one fetch.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FetchError {
    /// The server kept answering 429 past the rate-limit wait budget.
    #[snafu(display("Rate limited by {url}; gave up after {waits} waits"))]
    RateLimitExhausted {
        url: String,
        waits: u32,
        backtrace: Backtrace,
    },

    /// Non-2xx status on the final attempt.
    #[snafu(display("HTTP {status} from {url} after {attempts} attempt(s)"))]
    HttpStatus {
        url: String,
        status: StatusCode,
        attempts: u32,
        backtrace: Backtrace,
    },

    /// Network-level failure (connect, reset, body read) on the final attempt.
    #[snafu(display("Request to {url} failed after {attempts} attempt(s): {source}"))]
    Transport {
        url: String,
        attempts: u32,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The final attempt exceeded the client timeout.
    #[snafu(display("Request to {url} timed out after {attempts} attempt(s)"))]
    Timeout {
        url: String,
        attempts: u32,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A 2xx response whose body is not JSON. Never retried.
    #[snafu(display("Malformed JSON body from {url}: {source}"))]
    Parse {
        url: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

impl FetchError {
    /// Number of backoff attempts spent before giving up, where that applies.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            FetchError::HttpStatus { attempts, .. }
            | FetchError::Transport { attempts, .. }
            | FetchError::Timeout { attempts, .. } => Some(*attempts),
            FetchError::RateLimitExhausted { .. } | FetchError::Parse { .. } => None,
        }
    }
}
