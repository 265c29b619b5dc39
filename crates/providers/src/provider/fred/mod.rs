//! FRED (Federal Reserve Economic Data) provider.
//!
//! FRED serves US series only. Every lookup makes two calls:
//! - `GET {base}/series` for the series title, units and frequency
//! - `GET {base}/series/observations` for the dated values (`"."` marks a gap)
//!
//! An API key is required; without one the provider reports no data.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ProviderError;
use crate::fetch::{FetchRequest, HttpFetcher};
use crate::models::{
    classify_category, CategoryRule, CountryInfo, DataSource, Frequency, IndicatorCategory,
    IndicatorInfo, IndicatorQuery, IndicatorSeries, Metadata,
};
use crate::provider::normalize::{
    clip_to_range, collect_points, mapping_listing, resolve_native_code, MappingTable,
};
use crate::provider::IndicatorProvider;

const BASE_URL: &str = "https://api.stlouisfed.org/fred";
const PROVIDER_NAME: &str = "FRED";
const HOME_COUNTRY: &str = "USA";
const HOME_COUNTRY_NAME: &str = "United States";

/// Canonical indicator -> FRED series id.
const INDICATOR_MAP: MappingTable = &[
    ("GDP", "GDP"),
    ("GDPC1", "GDPC1"),
    ("INFLATION", "CPIAUCSL"),
    ("UNEMPLOYMENT", "UNRATE"),
    ("INTEREST_RATE", "FEDFUNDS"),
    ("GOVERNMENT_DEBT", "GFDEGDQ188S"),
    ("CONSUMER_CONFIDENCE", "UMCSENT"),
    ("INDUSTRIAL_PRODUCTION", "INDPRO"),
    ("RETAIL_SALES", "RSXFS"),
    ("HOUSING_STARTS", "HOUST"),
    ("M2", "M2SL"),
];

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::new(&["GDP"], IndicatorCategory::Gdp),
    CategoryRule::new(&["INFLATION", "CPI"], IndicatorCategory::Inflation),
    CategoryRule::new(&["UNEMPLOYMENT", "UNRATE"], IndicatorCategory::Unemployment),
    CategoryRule::new(&["RATE", "FEDFUNDS"], IndicatorCategory::InterestRate),
    CategoryRule::new(&["DEBT"], IndicatorCategory::GovernmentDebt),
    CategoryRule::new(&["CONFIDENCE"], IndicatorCategory::Confidence),
    CategoryRule::new(&["M2"], IndicatorCategory::MoneySupply),
    CategoryRule::new(&["INDUSTRIAL"], IndicatorCategory::Manufacturing),
    CategoryRule::new(&["RETAIL"], IndicatorCategory::Retail),
    CategoryRule::new(&["HOUSING", "HOUST"], IndicatorCategory::Housing),
];

// ============================================================================
// Response structures for the FRED API
// ============================================================================

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    seriess: Vec<SeriesInfo>,
}

#[derive(Debug, Deserialize)]
struct SeriesInfo {
    title: Option<String>,
    units: Option<String>,
    frequency: Option<String>,
    frequency_short: Option<String>,
    seasonal_adjustment: Option<String>,
    notes: Option<String>,
    last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    #[serde(default)]
    value: Value,
}

/// FRED indicator provider.
pub struct FredProvider {
    fetcher: Arc<HttpFetcher>,
    api_key: Option<String>,
    base_url: String,
}

impl FredProvider {
    pub fn new(fetcher: Arc<HttpFetcher>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn map_category(canonical: &str) -> IndicatorCategory {
        classify_category(canonical, CATEGORY_RULES)
    }

    /// Fetch and decode one FRED endpoint; failures are logged and yield `None`.
    async fn fetch<T: DeserializeOwned>(&self, request: FetchRequest) -> Option<T> {
        let url = request.url().to_string();
        let body = match self.fetcher.fetch_json(request).await {
            Ok(body) => body,
            Err(e) => {
                warn!("{} request failed for {}: {}", PROVIDER_NAME, url, e);
                return None;
            }
        };
        match serde_json::from_value(body) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Unexpected {} payload from {}: {}", PROVIDER_NAME, url, e);
                None
            }
        }
    }

    async fn series_info(
        &self,
        series_id: &str,
        api_key: &str,
        query: &IndicatorQuery,
    ) -> Option<SeriesInfo> {
        let request = FetchRequest::new(PROVIDER_NAME, format!("{}/series", self.base_url))
            .query("series_id", series_id)
            .query("api_key", api_key)
            .query("file_type", "json")
            .deadline(query.deadline);

        let response: SeriesResponse = self.fetch(request).await?;
        response.seriess.into_iter().next()
    }

    async fn observations(
        &self,
        series_id: &str,
        api_key: &str,
        query: &IndicatorQuery,
    ) -> Option<Vec<Observation>> {
        let mut request =
            FetchRequest::new(PROVIDER_NAME, format!("{}/series/observations", self.base_url))
                .query("series_id", series_id)
                .query("api_key", api_key)
                .query("file_type", "json")
                .deadline(query.deadline);

        if let Some(start) = query.start_date {
            request = request.query("observation_start", format_date(start));
        }
        if let Some(end) = query.end_date {
            request = request.query("observation_end", format_date(end));
        }

        let response: ObservationsResponse = self.fetch(request).await?;
        Some(response.observations)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// FRED stamps updates like `2024-02-02 07:44:02-06`.
fn parse_last_updated(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%#z").ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl IndicatorProvider for FredProvider {
    fn source(&self) -> DataSource {
        DataSource::Fred
    }

    async fn get_indicator(
        &self,
        query: &IndicatorQuery,
    ) -> Result<Option<IndicatorSeries>, ProviderError> {
        if query.country_code != HOME_COUNTRY {
            info!(
                "{} provider only supports {} data, got: {}",
                PROVIDER_NAME, HOME_COUNTRY, query.country_code
            );
            return Ok(None);
        }

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("{} API key not configured", PROVIDER_NAME);
            return Ok(None);
        };

        let (canonical, series_id) = resolve_native_code(INDICATOR_MAP, &query.indicator_id);

        let Some(info) = self.series_info(&series_id, api_key, query).await else {
            debug!("{} has no series metadata for {}", PROVIDER_NAME, series_id);
            return Ok(None);
        };

        let Some(observations) = self.observations(&series_id, api_key, query).await else {
            return Ok(None);
        };

        let frequency = info
            .frequency
            .as_deref()
            .and_then(Frequency::from_label)
            .unwrap_or(Frequency::Monthly);

        let mut data = collect_points(
            observations.iter().map(|o| (o.date.as_str(), &o.value)),
            info.units.as_deref(),
        );
        clip_to_range(&mut data, frequency, query.start_date, query.end_date);
        if data.is_empty() {
            info!(
                "{} returned no usable observations for {}",
                PROVIDER_NAME, series_id
            );
            return Ok(None);
        }

        let mut metadata = Metadata::new();
        metadata.insert("series_id".to_string(), json!(series_id));
        metadata.insert("canonical_id".to_string(), json!(canonical));
        metadata.insert(
            "seasonal_adjustment".to_string(),
            json!(info.seasonal_adjustment),
        );
        metadata.insert("frequency_short".to_string(), json!(info.frequency_short));

        Ok(Some(IndicatorSeries {
            name: info.title.clone().unwrap_or_else(|| canonical.clone()),
            category: Self::map_category(&canonical),
            description: info.notes,
            unit: info.units,
            frequency,
            source: DataSource::Fred,
            country_code: HOME_COUNTRY.to_string(),
            country_name: HOME_COUNTRY_NAME.to_string(),
            data,
            last_updated: parse_last_updated(info.last_updated.as_deref()),
            metadata,
            indicator_id: series_id,
        }))
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorInfo>, ProviderError> {
        Ok(mapping_listing(INDICATOR_MAP))
    }

    async fn list_countries(&self) -> Result<Vec<CountryInfo>, ProviderError> {
        Ok(vec![CountryInfo {
            region: Some("North America".to_string()),
            ..CountryInfo::new(HOME_COUNTRY, HOME_COUNTRY_NAME)
        }])
    }
}
