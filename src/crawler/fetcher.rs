//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one HTTP client carrying the crawler's identity headers
//! - Per-request timeouts
//! - Transparent retry with exponential backoff for transient failures
//! - Error classification into [`FetchError`]

use crate::config::HttpConfig;
use crate::{FetchError, FetchResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;

/// A completed response with a non-error status
#[derive(Debug)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Lowercased Content-Type header, empty when absent
    pub fn content_type(&self) -> String {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase()
    }
}

/// Bounded exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry
    pub base_delay: Duration,
    /// Cap for any single wait
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Wait before retry number `retry` (0-based): `base * 2^retry`, capped
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Status codes retried before surfacing an error
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Builds an HTTP client with the configured identity and timeout
///
/// # Example
///
/// ```no_run
/// use polk_scraper::config::HttpConfig;
/// use polk_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(accept) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, accept);
    }
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .connect_timeout(Duration::from_millis(config.request_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The crawler's only gateway to the network
///
/// Holds the single shared client; one request is in flight at a time.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(config)?,
            RetryPolicy::from_config(config),
        ))
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// GETs a URL, retrying transient failures internally
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout / connection / body read error | Retry with backoff |
    /// | HTTP 429, 500, 502, 503, 504 | Retry, honouring `Retry-After` seconds |
    /// | Other HTTP >= 400 | Immediate `HttpStatus` |
    /// | Malformed URL | Immediate `InvalidUrl` |
    ///
    /// When the retry budget runs out the last failure is returned.
    pub async fn fetch(&self, url: &str) -> FetchResult<FetchResponse> {
        let mut retry = 0;

        loop {
            tracing::debug!("GET {}", url);

            let wait = match self.fetch_once(url).await {
                Ok(response) if is_retryable_status(response.status) => {
                    if retry >= self.retry.max_retries {
                        tracing::warn!("HTTP {} for {}", response.status, url);
                        return Err(FetchError::HttpStatus {
                            url: url.to_string(),
                            status: response.status,
                        });
                    }
                    let wait = retry_after(&response.headers)
                        .map(|d| d.min(self.retry.max_delay))
                        .unwrap_or_else(|| self.retry.backoff(retry));
                    tracing::debug!(
                        "HTTP {} for {}, retry {}/{} in {:?}",
                        response.status,
                        url,
                        retry + 1,
                        self.retry.max_retries,
                        wait
                    );
                    wait
                }
                Ok(response) if response.status >= 400 => {
                    tracing::warn!("HTTP {} for {}", response.status, url);
                    return Err(FetchError::HttpStatus {
                        url: url.to_string(),
                        status: response.status,
                    });
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && retry < self.retry.max_retries => {
                    let wait = self.retry.backoff(retry);
                    tracing::debug!(
                        "{}, retry {}/{} in {:?}",
                        e,
                        retry + 1,
                        self.retry.max_retries,
                        wait
                    );
                    wait
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    return Err(e);
                }
            };

            tokio::time::sleep(wait).await;
            retry += 1;
        }
    }

    /// One attempt, without retry
    async fn fetch_once(&self, url: &str) -> FetchResult<FetchResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?
            .to_vec();

        Ok(FetchResponse {
            url: final_url,
            status,
            headers,
            body,
        })
    }
}

/// Maps a reqwest error onto the fetch taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Parses a `Retry-After` header given in whole seconds
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
