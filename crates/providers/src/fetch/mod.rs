//! Retry-tolerant HTTP JSON fetching.
//!
//! Every provider adapter goes through [`HttpFetcher::fetch_json`] for its
//! GET calls so that timeout and retry behavior is the same system-wide:
//!
//! - HTTP 200: the body is parsed as JSON and returned
//! - HTTP 429: wait `retry_delay * attempt` and try again
//! - any other status: fail immediately, no retry
//! - timeout / transport error / unparseable body: wait `retry_delay` and try again
//!
//! After `max_retries` attempts the last failure is returned. An optional
//! deadline bounds the whole call including retries; dropping the returned
//! future also drops the in-flight request.

use std::time::Duration;

use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::time::Instant;

use crate::errors::{FetchError, RetryClass};
use crate::settings::{ProviderSettings, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

/// Attempt budget and delay for the retry loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call (at least 1)
    pub max_retries: u32,
    /// Fixed delay after transport failures; base delay for 429 backoff
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// A single GET to issue through [`HttpFetcher`].
#[derive(Clone, Debug)]
pub struct FetchRequest {
    source: &'static str,
    url: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    max_retries: Option<u32>,
    deadline: Option<Instant>,
}

impl FetchRequest {
    /// `source` labels log lines and errors (e.g. "FRED").
    pub fn new(source: &'static str, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            max_retries: None,
            deadline: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Override the fetcher's attempt budget for this call.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Shared HTTP client with the configured timeout and retry policy.
///
/// Holds no per-call state; one instance is shared by every adapter.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(settings: &ProviderSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            policy: settings.retry_policy(),
        }
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Issue the GET, retrying per [`RetryPolicy`], and return the parsed JSON body.
    pub async fn fetch_json(&self, request: FetchRequest) -> Result<Value, FetchError> {
        if request.url.trim().is_empty() {
            return Err(FetchError::InvalidRequest(format!(
                "empty URL for {}",
                request.source
            )));
        }

        match request.deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.fetch_with_retry(&request)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            "Deadline exceeded fetching from {}: {}",
                            request.source, request.url
                        );
                        Err(FetchError::DeadlineExceeded {
                            provider: request.source.to_string(),
                        })
                    }
                }
            }
            None => self.fetch_with_retry(&request).await,
        }
    }

    async fn fetch_with_retry(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let max_retries = request
            .max_retries
            .unwrap_or(self.policy.max_retries)
            .max(1);
        let mut last_error = None;

        for attempt in 1..=max_retries {
            let error = match self.fetch_once(request).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            let has_next = attempt < max_retries;
            match error.retry_class() {
                RetryClass::Never => {
                    error!("{} from {}: {}", error, request.source, request.url);
                    return Err(error);
                }
                RetryClass::Backoff => {
                    let wait = self.policy.retry_delay * attempt;
                    warn!(
                        "Rate limited by {}, attempt {}/{}, waiting {:?}",
                        request.source, attempt, max_retries, wait
                    );
                    if has_next {
                        tokio::time::sleep(wait).await;
                    }
                }
                RetryClass::AfterDelay => {
                    warn!(
                        "{} fetching from {}, attempt {}/{}",
                        error, request.source, attempt, max_retries
                    );
                    if has_next {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
            }

            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| FetchError::Network {
            provider: request.source.to_string(),
            message: "no attempt was made".to_string(),
        }))
    }

    async fn fetch_once(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        debug!("GET {} ({})", request.url, request.source);

        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| transport_error(request.source, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                provider: request.source.to_string(),
            });
        }
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                provider: request.source.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    provider: request.source.to_string(),
                }
            } else {
                FetchError::Decode {
                    provider: request.source.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

fn transport_error(source: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            provider: source.to_string(),
        }
    } else {
        FetchError::Network {
            provider: source.to_string(),
            message: err.to_string(),
        }
    }
}
