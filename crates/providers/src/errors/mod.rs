//! Error types and retry classification for the providers crate.
//!
//! This module provides:
//! - [`FetchError`]: Failures of a single upstream HTTP call (the "upstream unavailable" family)
//! - [`ProviderError`]: Unexpected adapter failures surfaced to the manager
//! - [`RetryClass`]: Classification that drives the fetch retry loop

mod retry;

pub use retry::RetryClass;

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching from an upstream service.
///
/// Each variant is classified into a [`RetryClass`] via
/// [`retry_class`](Self::retry_class), which the fetch primitive uses to
/// decide whether to wait and try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request itself is malformed (e.g. empty URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream rate limited the request (HTTP 429) on every attempt.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The upstream that rate limited the request
        provider: String,
    },

    /// The request timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The upstream that timed out
        provider: String,
    },

    /// The upstream answered with a non-200, non-429 status.
    #[error("HTTP {status} from {provider}")]
    Status {
        /// The upstream that answered
        provider: String,
        /// HTTP status code
        status: u16,
    },

    /// Connection-level failure.
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The upstream being called
        provider: String,
        /// Transport error message
        message: String,
    },

    /// The body of a 200 response was not valid JSON.
    #[error("Invalid JSON from {provider}: {message}")]
    Decode {
        /// The upstream that answered
        provider: String,
        /// Parser error message
        message: String,
    },

    /// The caller's deadline passed before the fetch completed.
    #[error("Deadline exceeded: {provider}")]
    DeadlineExceeded {
        /// The upstream being called
        provider: String,
    },
}

impl FetchError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use econdata_providers::errors::{FetchError, RetryClass};
    ///
    /// let error = FetchError::RateLimited { provider: "FRED".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Backoff);
    ///
    /// let error = FetchError::Status { provider: "FRED".to_string(), status: 500 };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::InvalidRequest(_) | Self::Status { .. } | Self::DeadlineExceeded { .. } => {
                RetryClass::Never
            }
            Self::RateLimited { .. } => RetryClass::Backoff,
            Self::Timeout { .. } | Self::Network { .. } | Self::Decode { .. } => {
                RetryClass::AfterDelay
            }
        }
    }
}

/// Unexpected failures raised by a provider adapter.
///
/// The built-in adapters absorb upstream failures into "no data" results;
/// this type exists for listing calls and for adapters that do fail
/// unexpectedly. The manager logs these and moves on to the next source.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// An upstream call failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The upstream answered with a shape the adapter does not understand.
    #[error("Unexpected response from {provider}: {message}")]
    UnexpectedResponse {
        /// The upstream that answered
        provider: String,
        /// What was wrong with the payload
        message: String,
    },

    /// The source did not answer within its share of the lookup.
    #[error("{provider} timed out after {after:?}")]
    TimedOut {
        /// The adapter that was cut off
        provider: String,
        /// The budget it was given
        after: Duration,
    },

    /// Any other adapter-specific failure.
    #[error("Provider error: {provider} - {message}")]
    Provider {
        /// The adapter that failed
        provider: String,
        /// Failure description
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_never_retries() {
        let error = FetchError::Status {
            provider: "World Bank".to_string(),
            status: 404,
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_backs_off() {
        let error = FetchError::RateLimited {
            provider: "FRED".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Backoff);
    }

    #[test]
    fn test_transport_failures_retry_after_delay() {
        let timeout = FetchError::Timeout {
            provider: "OECD".to_string(),
        };
        let network = FetchError::Network {
            provider: "OECD".to_string(),
            message: "connection reset".to_string(),
        };
        let decode = FetchError::Decode {
            provider: "OECD".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(timeout.retry_class(), RetryClass::AfterDelay);
        assert_eq!(network.retry_class(), RetryClass::AfterDelay);
        assert_eq!(decode.retry_class(), RetryClass::AfterDelay);
    }

    #[test]
    fn test_deadline_and_invalid_request_are_terminal() {
        let deadline = FetchError::DeadlineExceeded {
            provider: "FRED".to_string(),
        };
        assert_eq!(deadline.retry_class(), RetryClass::Never);
        assert_eq!(
            FetchError::InvalidRequest("empty url".to_string()).retry_class(),
            RetryClass::Never
        );
    }

    #[test]
    fn test_error_display() {
        let error = FetchError::Status {
            provider: "FRED".to_string(),
            status: 500,
        };
        assert_eq!(format!("{}", error), "HTTP 500 from FRED");

        let error = ProviderError::UnexpectedResponse {
            provider: "OECD".to_string(),
            message: "missing dataSets".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Unexpected response from OECD: missing dataSets"
        );

        let error = ProviderError::TimedOut {
            provider: "fred".to_string(),
            after: Duration::from_secs(93),
        };
        assert_eq!(format!("{}", error), "fred timed out after 93s");
    }
}
