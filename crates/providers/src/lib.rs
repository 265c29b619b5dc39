//! Econdata Providers Crate
//!
//! This crate aggregates economic indicator time series from several
//! independent upstream statistics services behind one query interface.
//!
//! # Overview
//!
//! The providers crate supports:
//! - Multiple upstream sources: FRED, World Bank, OECD
//! - A canonical indicator schema ([`IndicatorSeries`]) every source is normalized into
//! - Retry-tolerant HTTP fetching with rate-limit backoff
//! - Per-country source preference ordering with fallback
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  ProviderManager |  (preference order + fallback)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | IndicatorProvider| --> |  IndicatorSeries |  (canonical schema)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |   HttpFetcher    |  (timeout, retry, 429 backoff)
//! +------------------+
//!          |
//!          v
//!   upstream JSON APIs
//! ```
//!
//! # Core Types
//!
//! - [`IndicatorSeries`] - Normalized indicator time series
//! - [`DataPoint`] - A single dated observation
//! - [`DataSource`] - Tag identifying an upstream source
//! - [`IndicatorQuery`] - Indicator, country and optional date range
//! - [`ProviderSettings`] - Timeouts, retries and enabled-provider flags

pub mod errors;
pub mod fetch;
pub mod manager;
pub mod models;
pub mod provider;
pub mod settings;

pub use errors::{FetchError, ProviderError, RetryClass};
pub use fetch::{FetchRequest, HttpFetcher, RetryPolicy};
pub use manager::{
    preference_order, AttemptOutcome, FetchDiagnostics, ProviderManager, SkipReason,
    SourceAttempt,
};
pub use models::{
    parse_observation_date, CountryInfo, DataPoint, DataSource, Frequency, IndicatorCategory,
    IndicatorInfo, IndicatorQuery, IndicatorSeries, ParseSourceError,
};
pub use provider::fred::FredProvider;
pub use provider::oecd::OecdProvider;
pub use provider::world_bank::WorldBankProvider;
pub use provider::IndicatorProvider;
pub use settings::ProviderSettings;
