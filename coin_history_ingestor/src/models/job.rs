use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format the upstream history endpoint expects (`DD-MM-YYYY`).
pub const API_DATE_FORMAT: &str = "%d-%m-%Y";

/// One unit of work: fetch a single coin's history for a single calendar day.
///
/// Jobs are built by the scheduler and handed to the fetcher exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchJob {
    coin: String,
    date: NaiveDate,
}

impl FetchJob {
    pub fn new(coin: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            coin: coin.into(),
            date,
        }
    }

    /// Coin identifier as the upstream API knows it (e.g. `bitcoin`).
    pub fn coin(&self) -> &str {
        &self.coin
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The job's date rendered in [`API_DATE_FORMAT`].
    pub fn api_date(&self) -> String {
        self.date.format(API_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for FetchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.coin, self.date)
    }
}

/// Expands the inclusive range `[start, end]` into one job per calendar day.
///
/// Returns an empty list when `start` is after `end`.
pub fn jobs_for_range(coin: &str, start: NaiveDate, end: NaiveDate) -> Vec<FetchJob> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| FetchJob::new(coin, day))
        .collect()
}
