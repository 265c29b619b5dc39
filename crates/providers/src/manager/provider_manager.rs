//! Provider manager for coordinating indicator sources.
//!
//! The manager owns one adapter per enabled source and answers lookups by
//! asking them in the country's preference order until one has data. Each
//! source gets its own time budget, so a hanging source costs at most that
//! budget before the next one is asked.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::diagnostics::{FetchDiagnostics, SkipReason};
use super::preference::preference_order;
use crate::errors::ProviderError;
use crate::fetch::HttpFetcher;
use crate::models::{CountryInfo, DataSource, IndicatorInfo, IndicatorQuery, IndicatorSeries};
use crate::provider::fred::FredProvider;
use crate::provider::oecd::OecdProvider;
use crate::provider::world_bank::WorldBankProvider;
use crate::provider::IndicatorProvider;
use crate::settings::ProviderSettings;

/// Coordinates the enabled providers behind one lookup.
pub struct ProviderManager {
    providers: BTreeMap<DataSource, Arc<dyn IndicatorProvider>>,
    source_timeout: Option<Duration>,
}

impl ProviderManager {
    /// Create a manager over the given providers.
    ///
    /// Providers are keyed by their source tag; a later provider with the
    /// same tag replaces an earlier one.
    pub fn new(providers: Vec<Arc<dyn IndicatorProvider>>) -> Self {
        let mut by_source = BTreeMap::new();
        for provider in providers {
            let source = provider.source();
            if by_source.insert(source, provider).is_some() {
                warn!("Provider for '{}' registered twice, keeping the last one", source);
            }
        }
        Self {
            providers: by_source,
            source_timeout: None,
        }
    }

    /// Give up on a source after `timeout` and move on to the next one.
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = Some(timeout);
        self
    }

    pub fn source_timeout(&self) -> Option<Duration> {
        self.source_timeout
    }

    /// Build the enabled adapters around one shared HTTP fetcher.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(settings));
        let mut providers: Vec<Arc<dyn IndicatorProvider>> = Vec::new();

        if settings.enable_fred {
            let mut fred = FredProvider::new(fetcher.clone(), settings.fred_api_key.clone());
            if let Some(url) = &settings.fred_base_url {
                fred = fred.with_base_url(url.as_str());
            }
            providers.push(Arc::new(fred));
        }

        if settings.enable_world_bank {
            let mut world_bank = WorldBankProvider::new(fetcher.clone());
            if let Some(url) = &settings.world_bank_base_url {
                world_bank = world_bank.with_base_url(url.as_str());
            }
            providers.push(Arc::new(world_bank));
        }

        if settings.enable_oecd {
            let mut oecd = OecdProvider::new(fetcher);
            if let Some(url) = &settings.oecd_base_url {
                oecd = oecd.with_base_url(url.as_str());
            }
            providers.push(Arc::new(oecd));
        }

        let manager = Self::new(providers).with_source_timeout(settings.source_timeout());
        info!(
            "Provider manager initialized with sources: {:?} (per-source timeout {:?})",
            manager.available_sources(),
            settings.source_timeout()
        );
        manager
    }

    /// Enabled source tags, in tag order.
    pub fn available_sources(&self) -> Vec<DataSource> {
        self.providers.keys().copied().collect()
    }

    pub fn is_enabled(&self, source: DataSource) -> bool {
        self.providers.contains_key(&source)
    }

    /// Fetch an indicator, falling back across sources.
    ///
    /// A preferred source (when enabled) is asked alone first. Otherwise,
    /// or when it has nothing, the enabled sources are asked in the
    /// country's preference order. The first non-empty series wins.
    pub async fn get_indicator(
        &self,
        query: &IndicatorQuery,
        preferred: Option<DataSource>,
    ) -> Option<IndicatorSeries> {
        self.get_indicator_with_diagnostics(query, preferred).await.0
    }

    /// Same as [`get_indicator`](Self::get_indicator), plus the per-source attempt log.
    pub async fn get_indicator_with_diagnostics(
        &self,
        query: &IndicatorQuery,
        preferred: Option<DataSource>,
    ) -> (Option<IndicatorSeries>, FetchDiagnostics) {
        let mut diagnostics = FetchDiagnostics::new();
        let mut tried_preferred = None;

        if let Some(source) = preferred {
            if let Some(provider) = self.providers.get(&source) {
                if let Some(series) = self.try_source(provider, query, &mut diagnostics).await {
                    return (Some(series), diagnostics);
                }
                tried_preferred = Some(source);
            } else {
                debug!("Preferred source '{}' is not enabled", source);
                diagnostics.record_skip(source, SkipReason::Disabled);
            }
        }

        for source in preference_order(&query.country_code) {
            if tried_preferred == Some(source) {
                diagnostics.record_skip(source, SkipReason::AlreadyTried);
                continue;
            }
            let Some(provider) = self.providers.get(&source) else {
                diagnostics.record_skip(source, SkipReason::Disabled);
                continue;
            };
            if let Some(series) = self.try_source(provider, query, &mut diagnostics).await {
                return (Some(series), diagnostics);
            }
        }

        warn!(
            "Could not fetch {} for {} from any source: {}",
            query.indicator_id,
            query.country_code,
            diagnostics.summary()
        );
        (None, diagnostics)
    }

    async fn try_source(
        &self,
        provider: &Arc<dyn IndicatorProvider>,
        query: &IndicatorQuery,
        diagnostics: &mut FetchDiagnostics,
    ) -> Option<IndicatorSeries> {
        let source = provider.source();
        debug!(
            "Asking '{}' for {} in {}",
            source, query.indicator_id, query.country_code
        );

        let attempt = match self.source_timeout {
            Some(limit) => tokio::time::timeout(limit, provider.get_indicator(query))
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::TimedOut {
                        provider: source.to_string(),
                        after: limit,
                    })
                }),
            None => provider.get_indicator(query).await,
        };

        match attempt {
            Ok(Some(series)) if !series.is_empty() => {
                info!(
                    "Successfully fetched {} for {} from '{}' ({} points)",
                    query.indicator_id,
                    query.country_code,
                    source,
                    series.data.len()
                );
                diagnostics.record_success(source);
                Some(series)
            }
            Ok(_) => {
                debug!("'{}' has no data for {}", source, query.indicator_id);
                diagnostics.record_no_data(source);
                None
            }
            Err(e) => {
                error!("Error fetching from '{}': {}", source, e);
                diagnostics.record_error(source, e.to_string());
                None
            }
        }
    }

    /// Indicator listings of every enabled source; failing sources are omitted.
    pub async fn list_available_indicators(&self) -> BTreeMap<DataSource, Vec<IndicatorInfo>> {
        let mut listings = BTreeMap::new();
        for (source, provider) in &self.providers {
            match provider.list_indicators().await {
                Ok(indicators) => {
                    listings.insert(*source, indicators);
                }
                Err(e) => error!("Error listing indicators from '{}': {}", source, e),
            }
        }
        listings
    }

    /// Country listings of every enabled source; failing sources are omitted.
    pub async fn list_available_countries(&self) -> BTreeMap<DataSource, Vec<CountryInfo>> {
        let mut listings = BTreeMap::new();
        for (source, provider) in &self.providers {
            match provider.list_countries().await {
                Ok(countries) => {
                    listings.insert(*source, countries);
                }
                Err(e) => error!("Error listing countries from '{}': {}", source, e),
            }
        }
        listings
    }
}
