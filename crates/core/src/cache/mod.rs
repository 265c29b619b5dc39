//! In-memory TTL cache for fetched series.

mod cache_key;
mod cache_manager;

use std::time::Duration;

use serde::Deserialize;

pub use cache_key::CacheKey;
pub use cache_manager::{CacheManager, CacheStats};

/// Default time-to-live for cached entries (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default interval between background sweeps of expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub default_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_CACHE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
