use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use snafu::{IntoError, ResultExt};
use tracing::{debug, warn};

use crate::{
    config::IngestorConfig,
    models::{job::FetchJob, payload::RawPayload},
    providers::{
        ClientBuildSnafu, FetchError, HistoryProvider, HttpStatusSnafu, InvalidBaseUrlSnafu,
        ParseSnafu, ProviderInitError, RateLimitExhaustedSnafu, TimeoutSnafu, TransportSnafu,
        retry::RetryPolicy,
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

/// A failed attempt that the backoff loop may retry.
enum Failure {
    Status(StatusCode),
    Transport(reqwest::Error),
}

impl Failure {
    fn into_fetch_error(self, url: String, attempts: u32) -> FetchError {
        match self {
            Failure::Status(status) => HttpStatusSnafu {
                url,
                status,
                attempts,
            }
            .build(),
            Failure::Transport(e) if e.is_timeout() => TimeoutSnafu { url, attempts }.into_error(e),
            Failure::Transport(e) => TransportSnafu { url, attempts }.into_error(e),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Status(status) => write!(f, "HTTP {status}"),
            Failure::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl CoinGeckoProvider {
    /// Creates a provider against `base_url` (e.g. `https://api.coingecko.com/api/v3`).
    ///
    /// `timeout` bounds each individual request, not the whole retry sequence.
    pub fn new(
        base_url: &str,
        policy: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, ProviderInitError> {
        let parsed = Url::parse(base_url).map_err(|e| {
            InvalidBaseUrlSnafu {
                url: base_url,
                message: e.to_string(),
            }
            .build()
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return InvalidBaseUrlSnafu {
                url: base_url,
                message: format!("unsupported scheme {:?}", parsed.scheme()),
            }
            .fail();
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coin-history/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    /// Creates a provider from the run configuration.
    pub fn from_config(config: &IngestorConfig) -> Result<Self, ProviderInitError> {
        Self::new(
            &config.api_base_url,
            config.retry_policy(),
            config.request_timeout(),
        )
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// `{base}/coins/{coin}/history?date=DD-MM-YYYY`
    pub fn history_url(&self, job: &FetchJob) -> String {
        format!(
            "{}/coins/{}/history?date={}",
            self.base_url,
            job.coin(),
            job.api_date()
        )
    }
}

#[async_trait]
impl HistoryProvider for CoinGeckoProvider {
    async fn fetch_history(&self, job: &FetchJob) -> Result<RawPayload, FetchError> {
        let url = self.history_url(job);
        let max_attempts = self.policy.attempts_allowed();
        let mut attempt = 1;
        let mut rate_limit_waits = 0;

        loop {
            debug!(%url, attempt, "requesting coin history");
            let failure = match self.client.get(&url).send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if rate_limit_waits >= self.policy.max_rate_limit_waits {
                        return RateLimitExhaustedSnafu {
                            url,
                            waits: rate_limit_waits,
                        }
                        .fail();
                    }
                    rate_limit_waits += 1;
                    let wait = self.policy.rate_limit_delay(response.headers());
                    warn!(%url, wait_secs = wait.as_secs_f64(), "Rate limited, retrying after wait");
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Ok(response) if response.status().is_success() => {
                    match response.bytes().await {
                        Ok(body) => {
                            let value = serde_json::from_slice(&body).context(ParseSnafu {
                                url: url.as_str(),
                            })?;
                            return Ok(RawPayload::new(value));
                        }
                        Err(e) => Failure::Transport(e),
                    }
                }
                Ok(response) => Failure::Status(response.status()),
                Err(e) => Failure::Transport(e),
            };

            if attempt >= max_attempts {
                return Err(failure.into_fetch_error(url, attempt));
            }
            let delay = self.policy.backoff_delay(attempt);
            warn!(
                %url,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "request failed, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
