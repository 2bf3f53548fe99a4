//! Blocking HTTP fetcher with bounded retry

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchCause, FetchError};

pub const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 10;

/// Upper bound on any single retry delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt; total attempts is `max_retries + 1`
    pub max_retries: u32,
    /// Delay before the first retry
    pub backoff: Duration,
    /// Multiplier applied to the delay after each retry (values below 1.0 act as 1.0)
    pub backoff_factor: f64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff: Duration::from_millis(1500),
            backoff_factor: 1.0,
            user_agent: DESKTOP_UA.to_string(),
        }
    }
}

pub struct Fetcher {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url` and return the body text, retrying transient failures.
    pub fn fetch(&self, url: &str) -> Result<String, FetchError> {
        validate_url(url)?;

        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut delay = self.config.backoff.min(MAX_BACKOFF);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.try_once(url) {
                Ok(body) => {
                    debug!(url, attempt, bytes = body.len(), "fetched listing page");
                    return Ok(body);
                }
                Err(cause) if cause.is_transient() && attempt < max_attempts => {
                    warn!(url, attempt, delay_ms = delay.as_millis() as u64, error = %cause, "fetch failed, retrying");
                    thread::sleep(delay);
                    if attempt + 1 < max_attempts {
                        delay = next_delay(delay, self.config.backoff_factor);
                    }
                }
                Err(cause) => {
                    return Err(FetchError::Failed {
                        url: url.to_string(),
                        attempts: attempt,
                        cause,
                    });
                }
            }
        }
    }

    fn try_once(&self, url: &str) -> Result<String, FetchCause> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status));
        }
        Ok(response.text()?)
    }
}

/// The delay after `delay` for a given factor. Factors below 1.0 (and NaN)
/// keep the delay constant; the result saturates at [`MAX_BACKOFF`].
pub fn next_delay(delay: Duration, factor: f64) -> Duration {
    let factor = factor.max(1.0);
    if delay.is_zero() || factor == 1.0 {
        return delay.min(MAX_BACKOFF);
    }
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor)
        .map_or(MAX_BACKOFF, |next| next.min(MAX_BACKOFF))
}

fn validate_url(url: &str) -> Result<(), FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {:?}", other),
        }),
    }
}
