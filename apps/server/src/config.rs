use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use econdata_core::CacheSettings;
use econdata_providers::ProviderSettings;

/// Headroom on top of the lookup budget for the default request timeout
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    /// Whole-request timeout. Defaults to the lookup budget plus a margin so
    /// every enabled source gets its full per-source timeout.
    pub request_timeout: Duration,
    pub providers: ProviderSettings,
    pub cache: CacheSettings,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; unset or unparsable numbers fall back to defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = var("ECON_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid ECON_LISTEN_ADDR")?;
        let cors_allow = var("ECON_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = ProviderSettings::default();
        let providers = ProviderSettings {
            request_timeout: seconds(var("REQUEST_TIMEOUT"), defaults.request_timeout),
            max_retries: var("MAX_RETRIES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_delay: seconds(var("RETRY_DELAY"), defaults.retry_delay),
            source_timeout: Some(seconds(var("SOURCE_TIMEOUT"), Duration::ZERO))
                .filter(|t| !t.is_zero()),
            enable_fred: flag(var("ENABLE_FRED"), defaults.enable_fred),
            enable_world_bank: flag(var("ENABLE_WORLD_BANK"), defaults.enable_world_bank),
            enable_oecd: flag(var("ENABLE_OECD"), defaults.enable_oecd),
            fred_api_key: var("FRED_API_KEY").filter(|k| !k.trim().is_empty()),
            fred_base_url: var("FRED_BASE_URL"),
            world_bank_base_url: var("WORLD_BANK_BASE_URL"),
            oecd_base_url: var("OECD_BASE_URL"),
        };

        let request_timeout = var("ECON_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| providers.lookup_budget() + REQUEST_TIMEOUT_MARGIN);

        let cache_defaults = CacheSettings::default();
        let cache = CacheSettings {
            default_ttl: seconds(var("CACHE_TTL"), cache_defaults.default_ttl),
            sweep_interval: seconds(var("CACHE_SWEEP_INTERVAL"), cache_defaults.sweep_interval),
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            providers,
            cache,
        })
    }

    /// Whether a lookup that exhausts every source still ends before the request times out.
    pub fn request_timeout_covers_lookup(&self) -> bool {
        self.request_timeout >= self.providers.lookup_budget()
    }
}

fn seconds(raw: Option<String>, default: Duration) -> Duration {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(default)
}

fn flag(raw: Option<String>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
