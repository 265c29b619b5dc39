use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use econdata_providers::{
    CountryInfo, DataSource, IndicatorQuery, IndicatorSeries, ProviderManager,
};
use futures::future::join_all;
use log::{debug, info, warn};

use super::catalog;
use super::indicators_model::{
    AnalyticsReport, CalculationRequest, CategoryListing, CompareRequest, Comparison,
    CorrelationReport, CorrelationRequest, CountryListing, EconomicSummary, IndicatorListing,
    IndicatorRef, IndicatorRequest, Period, RegionListing, SummaryEntry,
};
use super::indicators_traits::IndicatorServiceTrait;
use crate::analytics::{self, Calculation};
use crate::cache::{CacheKey, CacheManager, CacheStats};
use crate::constants::{
    CORRELATION_DECIMALS, DEFAULT_LOOKBACK_DAYS, MAX_COMPARE_COUNTRIES, MIN_COMPARE_COUNTRIES,
    SUMMARY_INDICATORS, SUMMARY_LOOKBACK_DAYS,
};
use crate::errors::{Result, ServiceError};

/// Indicator query service.
///
/// Every series lookup goes through the cache; a miss asks the provider
/// manager, which walks the sources in preference order.
pub struct IndicatorService {
    manager: Arc<ProviderManager>,
    cache: Arc<CacheManager<IndicatorSeries>>,
}

impl IndicatorService {
    pub fn new(manager: Arc<ProviderManager>, cache: Arc<CacheManager<IndicatorSeries>>) -> Self {
        Self { manager, cache }
    }

    /// Cached, fallback-aware series lookup.
    async fn fetch_series(
        &self,
        indicator: &str,
        country: &str,
        period: Period,
        source: Option<DataSource>,
    ) -> Option<IndicatorSeries> {
        let key = CacheKey::new()
            .arg("indicator")
            .arg(indicator)
            .arg(country)
            .kwarg("start_date", period.start)
            .kwarg("end_date", period.end)
            .kwarg("source", source.map_or("all", |s| s.as_str()))
            .digest();

        let query = IndicatorQuery::new(indicator, country)
            .with_range(Some(period.start), Some(period.end));

        self.cache
            .get_or_fetch(&key, None, || async {
                self.manager.get_indicator(&query, source).await
            })
            .await
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// ISO3 (or ISO2) letters, upper-cased.
fn normalize_country(country: &str) -> Result<String> {
    let code = country.trim().to_ascii_uppercase();
    if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServiceError::validation(format!(
            "Invalid country code '{}'",
            country
        )));
    }
    Ok(code)
}

fn normalize_indicator(indicator: &str) -> Result<String> {
    let code = indicator.trim().to_ascii_uppercase();
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/');
    if code.is_empty() || !code.chars().all(allowed) {
        return Err(ServiceError::validation(format!(
            "Invalid indicator code '{}'",
            indicator
        )));
    }
    Ok(code)
}

/// Fill in missing bounds (end = today, start = end - lookback) and check order.
fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    lookback_days: i64,
) -> Result<Period> {
    let end = end.unwrap_or_else(today);
    let start = start.unwrap_or_else(|| end - chrono::Duration::days(lookback_days));
    if start > end {
        return Err(ServiceError::validation(format!(
            "start_date {} is after end_date {}",
            start, end
        )));
    }
    Ok(Period { start, end })
}

#[async_trait]
impl IndicatorServiceTrait for IndicatorService {
    async fn get_indicator(&self, request: IndicatorRequest) -> Result<IndicatorSeries> {
        let indicator = normalize_indicator(&request.indicator)?;
        let country = normalize_country(&request.country)?;
        let period = resolve_period(request.start_date, request.end_date, DEFAULT_LOOKBACK_DAYS)?;

        self.fetch_series(&indicator, &country, period, request.source)
            .await
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "Indicator '{}' not found for country '{}'",
                    indicator, country
                ))
            })
    }

    async fn compare(&self, request: CompareRequest) -> Result<Comparison> {
        let count = request.countries.len();
        if count < MIN_COMPARE_COUNTRIES {
            return Err(ServiceError::validation(format!(
                "At least {} countries required for comparison",
                MIN_COMPARE_COUNTRIES
            )));
        }
        if count > MAX_COMPARE_COUNTRIES {
            return Err(ServiceError::validation(format!(
                "Maximum {} countries allowed for comparison",
                MAX_COMPARE_COUNTRIES
            )));
        }

        let indicator = normalize_indicator(&request.indicator)?;
        let countries = request
            .countries
            .iter()
            .map(|c| normalize_country(c))
            .collect::<Result<Vec<_>>>()?;
        let period = resolve_period(request.start_date, request.end_date, DEFAULT_LOOKBACK_DAYS)?;

        let results = join_all(
            countries
                .iter()
                .map(|country| self.fetch_series(&indicator, country, period, request.source)),
        )
        .await;

        let mut indicator_name = None;
        let mut by_country = BTreeMap::new();
        for (country, series) in countries.into_iter().zip(results) {
            match series {
                Some(series) => {
                    indicator_name.get_or_insert_with(|| series.name.clone());
                    by_country.insert(country, series);
                }
                None => debug!("No {} data for {} in comparison", indicator, country),
            }
        }

        let Some(indicator_name) = indicator_name else {
            return Err(ServiceError::not_found(format!(
                "No data found for indicator '{}'",
                indicator
            )));
        };

        Ok(Comparison {
            indicator,
            indicator_name,
            countries: by_country,
            comparison_period: period,
        })
    }

    async fn calculate(&self, request: CalculationRequest) -> Result<AnalyticsReport> {
        let indicator = normalize_indicator(&request.indicator)?;
        let country = normalize_country(&request.country)?;
        let period = resolve_period(
            Some(request.start_date),
            Some(request.end_date),
            DEFAULT_LOOKBACK_DAYS,
        )?;

        let series = self
            .fetch_series(&indicator, &country, period, None)
            .await
            .ok_or_else(|| {
                ServiceError::not_found(format!("No data found for {} in {}", indicator, country))
            })?;

        let calculations = request.requested();
        let values = series.values();

        let statistics = analytics::summarize(&values, &calculations);
        let trend = if !calculations.contains(&Calculation::Trend) {
            None
        } else if request.is_explicit() {
            analytics::trend(&values)?
        } else {
            analytics::trend(&values).unwrap_or_else(|e| {
                debug!("Leaving trend out for {}/{}: {}", indicator, country, e);
                None
            })
        };

        Ok(AnalyticsReport {
            indicator,
            country,
            period,
            statistics,
            trend,
        })
    }

    async fn correlate(&self, request: CorrelationRequest) -> Result<CorrelationReport> {
        let first = normalize_indicator(&request.indicator1)?;
        let second = normalize_indicator(&request.indicator2)?;
        let country = normalize_country(&request.country)?;
        let period = resolve_period(request.start_date, request.end_date, DEFAULT_LOOKBACK_DAYS)?;

        let (a, b) = futures::join!(
            self.fetch_series(&first, &country, period, None),
            self.fetch_series(&second, &country, period, None)
        );
        let (Some(a), Some(b)) = (a, b) else {
            return Err(ServiceError::not_found(format!(
                "One or both indicators not found: {}, {} for {}",
                first, second, country
            )));
        };

        let correlation = analytics::correlate(&a.data, &b.data)?;

        Ok(CorrelationReport::new(
            IndicatorRef {
                id: first,
                name: a.name,
            },
            IndicatorRef {
                id: second,
                name: b.name,
            },
            country,
            period,
            &correlation,
            CORRELATION_DECIMALS,
        ))
    }

    async fn summary(&self, country: &str) -> Result<EconomicSummary> {
        let country = normalize_country(country)?;
        let period = resolve_period(None, None, SUMMARY_LOOKBACK_DAYS)?;

        let results = join_all(
            SUMMARY_INDICATORS
                .iter()
                .map(|indicator| self.fetch_series(indicator, &country, period, None)),
        )
        .await;

        let indicators: BTreeMap<String, SummaryEntry> = SUMMARY_INDICATORS
            .iter()
            .zip(results)
            .filter_map(|(indicator, series)| {
                let series = series?;
                let latest = series.latest()?;
                Some((
                    indicator.to_string(),
                    SummaryEntry {
                        name: series.name.clone(),
                        value: latest.value,
                        unit: latest.unit.clone().or_else(|| series.unit.clone()),
                        date: latest.date,
                        source: series.source,
                    },
                ))
            })
            .collect();

        if indicators.is_empty() {
            return Err(ServiceError::not_found(format!(
                "No economic data found for {}",
                country
            )));
        }

        info!(
            "Economic summary for {}: {} of {} indicators",
            country,
            indicators.len(),
            SUMMARY_INDICATORS.len()
        );
        Ok(EconomicSummary {
            country,
            as_of: Utc::now(),
            indicators,
        })
    }

    async fn list_indicators(&self) -> IndicatorListing {
        let indicators = self.manager.list_available_indicators().await;
        IndicatorListing {
            sources: self.manager.available_sources(),
            total: indicators.values().map(Vec::len).sum(),
            indicators,
        }
    }

    async fn list_countries(
        &self,
        region: Option<&str>,
        source: Option<DataSource>,
    ) -> CountryListing {
        let mut sources = self.manager.list_available_countries().await;

        if let Some(source) = source {
            sources.retain(|s, _| *s == source);
        }
        if let Some(region) = region.map(str::trim).filter(|r| !r.is_empty()) {
            for countries in sources.values_mut() {
                countries.retain(|c| {
                    c.region
                        .as_deref()
                        .is_some_and(|r| r.eq_ignore_ascii_case(region))
                });
            }
        }

        let unique: BTreeSet<&str> = sources
            .values()
            .flatten()
            .map(|c| c.code.as_str())
            .collect();
        let total_unique_countries = unique.len();

        CountryListing {
            total_entries: sources.values().map(Vec::len).sum(),
            total_unique_countries,
            sources,
        }
    }

    async fn country_info(&self, country: &str) -> Result<CountryInfo> {
        let code = normalize_country(country)?;
        let listings = self.manager.list_available_countries().await;

        let mut matches = listings
            .into_values()
            .flatten()
            .filter(|c| c.code.eq_ignore_ascii_case(&code))
            .peekable();
        let first = matches.peek().cloned();

        matches
            .find(|c| c.region.is_some())
            .or(first)
            .ok_or_else(|| {
                warn!("Country '{}' not listed by any source", code);
                ServiceError::not_found(format!("Country '{}' not found", code))
            })
    }

    fn categories(&self) -> CategoryListing {
        catalog::categories()
    }

    fn regions(&self) -> RegionListing {
        catalog::regions()
    }

    fn available_sources(&self) -> Vec<DataSource> {
        self.manager.available_sources()
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cleanup_cache(&self) -> usize {
        self.cache.cleanup_expired()
    }
}
