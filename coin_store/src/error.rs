//! Error type shared by the store's connection, migration and repository code.

use thiserror::Error;

/// Errors raised by the coin store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be reached or the URL was rejected by the driver.
    #[error("failed to connect to store: {0}")]
    Connection(#[from] diesel::ConnectionError),

    /// A statement failed, including constraint violations outside the declared
    /// conflict targets.
    #[error("store query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// Applying the embedded migrations failed.
    #[error("failed to run migrations: {0}")]
    Migration(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The URL names a backend this build does not support.
    #[error("unsupported database URL: {0}")]
    UnsupportedUrl(String),
}

/// Result alias used across the store.
pub type StoreResult<T> = Result<T, StoreError>;
