//! Econdata Core - caching, analytics and the indicator query surface.
//!
//! This crate sits on top of `econdata-providers`. It adds:
//! - A TTL cache keyed by a digest of the query arguments
//! - Descriptive statistics, trend regression and cross-indicator correlation
//! - [`IndicatorService`], the query surface shared by every front end

pub mod analytics;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod indicators;

pub use analytics::{
    correlate, summarize, trend, AnalyticsError, Correlation, CorrelationDirection,
    CorrelationStrength, Statistics, TrendAnalysis, TrendDirection,
};
pub use cache::{CacheKey, CacheManager, CacheSettings, CacheStats};
pub use errors::{Result, ServiceError};
pub use indicators::{IndicatorService, IndicatorServiceTrait};
