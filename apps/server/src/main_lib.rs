use std::sync::Arc;
use std::time::Duration;

use econdata_core::{CacheManager, IndicatorService, IndicatorServiceTrait};
use econdata_providers::ProviderManager;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub indicator_service: Arc<dyn IndicatorServiceTrait>,
    pub cache_sweep_interval: Duration,
}

impl AppState {
    pub fn new(indicator_service: Arc<dyn IndicatorServiceTrait>, cache_sweep_interval: Duration) -> Self {
        Self {
            indicator_service,
            cache_sweep_interval,
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("ECON_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let manager = Arc::new(ProviderManager::from_settings(&config.providers));
    let sources = manager.available_sources();
    if sources.is_empty() {
        anyhow::bail!("No indicator sources enabled; set ENABLE_FRED, ENABLE_WORLD_BANK or ENABLE_OECD");
    }
    if config.providers.enable_fred && config.providers.fred_api_key.is_none() {
        tracing::warn!("FRED_API_KEY is not set; FRED lookups will report no data");
    }
    tracing::info!(
        "Enabled sources: {}",
        sources.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    );

    if !config.request_timeout_covers_lookup() {
        tracing::warn!(
            "Request timeout {:?} is shorter than a full fallback walk ({:?}); slow sources may cut later ones off",
            config.request_timeout,
            config.providers.lookup_budget()
        );
    }

    let cache = Arc::new(CacheManager::new(config.cache.default_ttl));
    let service = IndicatorService::new(manager, cache);

    Ok(Arc::new(AppState::new(
        Arc::new(service),
        config.cache.sweep_interval,
    )))
}
