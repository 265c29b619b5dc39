//! Provider configuration.
//!
//! [`ProviderSettings`] is built once at process start (usually from the
//! environment by the server) and handed to [`ProviderManager::from_settings`],
//! which constructs the enabled adapters around one shared [`HttpFetcher`].
//!
//! [`ProviderManager::from_settings`]: crate::manager::ProviderManager::from_settings
//! [`HttpFetcher`]: crate::fetch::HttpFetcher

use std::time::Duration;

use serde::Deserialize;

use crate::fetch::RetryPolicy;

/// Default total timeout for a single upstream HTTP call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per upstream call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Total timeout for one HTTP call
    pub request_timeout: Duration,

    /// Attempts per upstream call (at least 1)
    pub max_retries: u32,

    /// Base delay between attempts; rate-limited attempts wait `retry_delay * attempt`
    pub retry_delay: Duration,

    /// Budget for one source's attempt at a lookup. Unset means [`call_budget`](Self::call_budget).
    pub source_timeout: Option<Duration>,

    pub enable_fred: bool,
    pub enable_world_bank: bool,
    pub enable_oecd: bool,

    /// FRED requires a key; without one the FRED adapter always reports no data
    pub fred_api_key: Option<String>,

    /// Base URL overrides, mostly for tests and mirrors
    pub fred_base_url: Option<String>,
    pub world_bank_base_url: Option<String>,
    pub oecd_base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            source_timeout: None,
            enable_fred: true,
            enable_world_bank: true,
            enable_oecd: true,
            fred_api_key: None,
            fred_base_url: None,
            world_bank_base_url: None,
            oecd_base_url: None,
        }
    }
}

impl ProviderSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.max(1),
            retry_delay: self.retry_delay,
        }
    }

    /// Worst case of one fetch: every attempt runs into the timeout and
    /// every wait is a rate-limit backoff.
    pub fn call_budget(&self) -> Duration {
        let attempts = self.retry_policy().max_retries;
        let backoff_steps = attempts * (attempts - 1) / 2;
        self.request_timeout * attempts + self.retry_delay * backoff_steps
    }

    pub fn source_timeout(&self) -> Duration {
        self.source_timeout.unwrap_or_else(|| self.call_budget())
    }

    pub fn enabled_sources(&self) -> u32 {
        [self.enable_fred, self.enable_world_bank, self.enable_oecd]
            .iter()
            .filter(|enabled| **enabled)
            .count() as u32
    }

    /// Longest a lookup can take when every enabled source uses its full budget.
    pub fn lookup_budget(&self) -> Duration {
        self.source_timeout() * self.enabled_sources()
    }
}
