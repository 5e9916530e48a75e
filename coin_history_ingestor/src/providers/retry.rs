//! Retry rules for the history fetcher.
//!
//! Two independent budgets apply to one fetch:
//! - **Backoff budget** (`max_attempts`): transport errors, timeouts and non-2xx,
//!   non-429 statuses. The delay before attempt `n + 1` is
//!   `base_delay * 2^(n - 1)`, capped at `max_delay`.
//! - **Rate-limit budget** (`max_rate_limit_waits`): HTTP 429. The wait is taken from
//!   `Retry-After` (seconds) and does not consume backoff attempts.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Retry configuration for one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, counting the first request. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound for any single backoff delay.
    pub max_delay: Duration,
    /// How many 429 responses are waited out before giving up.
    pub max_rate_limit_waits: u32,
    /// Wait used when a 429 carries no usable `Retry-After`.
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_rate_limit_waits: 10,
            default_retry_after: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub(crate) fn attempts_allowed(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to sleep after failed attempt number `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }

    /// How long to wait before re-issuing a rate-limited request.
    pub fn rate_limit_delay(&self, headers: &HeaderMap) -> Duration {
        parse_retry_after(headers).unwrap_or(self.default_retry_after)
    }
}

/// Parses `Retry-After` as a (possibly fractional) number of seconds.
///
/// Returns `None` for absent, non-numeric, negative or non-finite values.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let secs: f64 = raw.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
