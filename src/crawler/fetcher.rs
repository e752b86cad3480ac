//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of the harvester:
//! - Building the HTTP client with the configured user agent and timeout
//! - Single GET requests classified into typed failures
//! - Caller-side bounded retry for transient failures

use crate::config::HttpConfig;
use rand::Rng;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single page fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Connection, TLS, DNS or body read failure
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Returns true if a later attempt might succeed
    ///
    /// Timeouts, network failures, 429 and 5xx statuses are transient; other
    /// statuses (404, 410, ...) are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::HttpStatus(code) => *code == 429 || (500..600).contains(code),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Source of page bodies
///
/// The catalog crawler and the worker pool only depend on this trait; the
/// production implementation is [`HttpFetcher`].
pub trait PageSource: Send + Sync {
    /// Fetches a page body with a single attempt
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use litres_harvest::config::HttpConfig;
/// use litres_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed page source
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration and wraps it
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        fetch_url(&self.client, url)
    }
}

/// Fetches a URL with a single GET request
///
/// # Error classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | body text |
/// | Other status | `HttpStatus(code)` |
/// | Client timeout | `Timeout` |
/// | Connection / TLS / body read failure | `Network` |
///
/// No retry happens here; see [`fetch_with_retry`].
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    Ok(response.text().await?)
}

/// Retry policy for book page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Base delay; attempt `n` waits `backoff * n` plus jitter
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based)
    ///
    /// Linear in the attempt number with up to half the base backoff of random
    /// jitter added.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff.saturating_mul(attempt);
        let jitter_cap = self.backoff.as_millis() as u64 / 2;
        if jitter_cap == 0 {
            return base;
        }
        let jitter = rand::thread_rng().gen_range(0..=jitter_cap);
        base + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Fetches a page, retrying transient failures according to `policy`
///
/// Permanent failures return immediately. The last error is returned when
/// every attempt failed.
pub async fn fetch_with_retry<S: PageSource>(
    source: &S,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let mut attempt = 0;

    loop {
        match source.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "Retrying {} after {} (attempt {}/{}, waiting {:?})",
                    url,
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
