use async_trait::async_trait;
use econdata_providers::{CountryInfo, DataSource, IndicatorSeries};

use super::indicators_model::{
    AnalyticsReport, CalculationRequest, CategoryListing, CompareRequest, Comparison,
    CorrelationReport, CorrelationRequest, CountryListing, EconomicSummary, IndicatorListing,
    IndicatorRequest, RegionListing,
};
use crate::cache::CacheStats;
use crate::errors::Result;

/// Query surface shared by every front end.
#[async_trait]
pub trait IndicatorServiceTrait: Send + Sync {
    /// One indicator for one country; NotFound when no source has data.
    async fn get_indicator(&self, request: IndicatorRequest) -> Result<IndicatorSeries>;

    /// One indicator across 2 to 10 countries.
    async fn compare(&self, request: CompareRequest) -> Result<Comparison>;

    async fn calculate(&self, request: CalculationRequest) -> Result<AnalyticsReport>;

    async fn correlate(&self, request: CorrelationRequest) -> Result<CorrelationReport>;

    /// Latest value of the headline indicators over the last year.
    async fn summary(&self, country: &str) -> Result<EconomicSummary>;

    async fn list_indicators(&self) -> IndicatorListing;

    async fn list_countries(
        &self,
        region: Option<&str>,
        source: Option<DataSource>,
    ) -> CountryListing;

    async fn country_info(&self, country: &str) -> Result<CountryInfo>;

    fn categories(&self) -> CategoryListing;

    fn regions(&self) -> RegionListing;

    fn available_sources(&self) -> Vec<DataSource>;

    fn cache_stats(&self) -> CacheStats;

    fn clear_cache(&self);

    /// Drop expired cache entries; returns how many were removed.
    fn cleanup_cache(&self) -> usize;
}
