//! World Bank Open Data provider.
//!
//! The v2 API wraps every JSON payload as `[paging, rows]`. Error payloads
//! come back as a one-element array carrying a `message` list, so a missing
//! second element is treated as "no data".

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{FetchError, ProviderError};
use crate::fetch::{FetchRequest, HttpFetcher};
use crate::models::{
    classify_category, CategoryRule, CountryInfo, DataSource, Frequency, IndicatorCategory,
    IndicatorInfo, IndicatorQuery, IndicatorSeries, Metadata,
};
use crate::provider::normalize::{
    clip_to_range, collect_points, mapping_listing, resolve_native_code, MappingTable,
};
use crate::provider::IndicatorProvider;

const BASE_URL: &str = "https://api.worldbank.org/v2";
const PROVIDER_NAME: &str = "World Bank";
const OBSERVATIONS_PER_PAGE: u32 = 1000;
const COUNTRIES_PER_PAGE: u32 = 300;
/// First year of World Bank WDI coverage.
const FIRST_YEAR: i32 = 1960;
const AGGREGATES_REGION: &str = "Aggregates";

/// Canonical indicator -> WDI indicator code.
const INDICATOR_MAP: MappingTable = &[
    ("GDP", "NY.GDP.MKTP.CD"),
    ("GDP_GROWTH", "NY.GDP.MKTP.KD.ZG"),
    ("GDP_PER_CAPITA", "NY.GDP.PCAP.CD"),
    ("INFLATION", "FP.CPI.TOTL.ZG"),
    ("UNEMPLOYMENT", "SL.UEM.TOTL.ZS"),
    ("POPULATION", "SP.POP.TOTL"),
    ("GOVERNMENT_DEBT", "GC.DOD.TOTL.GD.ZS"),
    ("EXPORTS", "NE.EXP.GNFS.ZS"),
    ("IMPORTS", "NE.IMP.GNFS.ZS"),
    ("FDI", "BX.KLT.DINV.WD.GD.ZS"),
    ("CURRENT_ACCOUNT", "BN.CAB.XOKA.GD.ZS"),
];

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::new(&["GDP"], IndicatorCategory::Gdp),
    CategoryRule::new(&["INFLATION", "CPI"], IndicatorCategory::Inflation),
    CategoryRule::new(&["UNEMPLOYMENT"], IndicatorCategory::Unemployment),
    CategoryRule::new(&["DEBT"], IndicatorCategory::GovernmentDebt),
    CategoryRule::new(&["EXPORT", "IMPORT", "TRADE"], IndicatorCategory::Trade),
];

// ============================================================================
// Response structures for the World Bank API
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndicatorMeta {
    name: Option<String>,
    unit: Option<String>,
    source_note: Option<String>,
    source_organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    #[serde(default)]
    value: Value,
    country: Option<IdValue>,
}

#[derive(Debug, Deserialize)]
struct IdValue {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryRow {
    id: String,
    name: String,
    region: Option<IdValue>,
    income_level: Option<IdValue>,
}

/// Pull the row list out of a `[paging, rows]` envelope.
fn rows<T: DeserializeOwned>(body: Value) -> Result<Option<Vec<T>>, serde_json::Error> {
    match body {
        Value::Array(mut parts) if parts.len() >= 2 => {
            let rows = parts.swap_remove(1);
            if rows.is_null() {
                return Ok(None);
            }
            serde_json::from_value(rows).map(Some)
        }
        _ => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// World Bank indicator provider.
pub struct WorldBankProvider {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl WorldBankProvider {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self {
            fetcher,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn map_category(canonical: &str) -> IndicatorCategory {
        classify_category(canonical, CATEGORY_RULES)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        request: FetchRequest,
    ) -> Result<Option<Vec<T>>, FetchError> {
        let url = request.url().to_string();
        let body = self.fetcher.fetch_json(request).await?;
        rows(body).map_err(|e| {
            warn!("Unexpected {} payload from {}: {}", PROVIDER_NAME, url, e);
            FetchError::Decode {
                provider: PROVIDER_NAME.to_string(),
                message: e.to_string(),
            }
        })
    }

    async fn indicator_meta(&self, code: &str, query: &IndicatorQuery) -> Option<IndicatorMeta> {
        let request = FetchRequest::new(
            PROVIDER_NAME,
            format!("{}/indicator/{}", self.base_url, urlencoding::encode(code)),
        )
        .query("format", "json")
        .deadline(query.deadline);

        match self.fetch_rows::<IndicatorMeta>(request).await {
            Ok(rows) => rows.and_then(|rows| rows.into_iter().next()),
            Err(e) => {
                warn!("{} metadata lookup failed for {}: {}", PROVIDER_NAME, code, e);
                None
            }
        }
    }

    async fn observations(&self, code: &str, query: &IndicatorQuery) -> Option<Vec<Observation>> {
        let mut request = FetchRequest::new(
            PROVIDER_NAME,
            format!(
                "{}/country/{}/indicator/{}",
                self.base_url,
                urlencoding::encode(&query.country_code),
                urlencoding::encode(code)
            ),
        )
        .query("format", "json")
        .query("per_page", OBSERVATIONS_PER_PAGE)
        .deadline(query.deadline);

        if let Some(range) = year_range(query.start_date, query.end_date) {
            request = request.query("date", range);
        }

        match self.fetch_rows::<Observation>(request).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "{} observations failed for {}/{}: {}",
                    PROVIDER_NAME, query.country_code, code, e
                );
                None
            }
        }
    }
}

/// `date=Y1:Y2` filter; unset bounds fall back to full coverage.
fn year_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let first = start.map(|d| d.year()).unwrap_or(FIRST_YEAR);
    let last = end.map(|d| d.year()).unwrap_or_else(|| Utc::now().year());
    Some(format!("{}:{}", first, last))
}

#[async_trait]
impl IndicatorProvider for WorldBankProvider {
    fn source(&self) -> DataSource {
        DataSource::WorldBank
    }

    async fn get_indicator(
        &self,
        query: &IndicatorQuery,
    ) -> Result<Option<IndicatorSeries>, ProviderError> {
        let (canonical, code) = resolve_native_code(INDICATOR_MAP, &query.indicator_id);

        let Some(meta) = self.indicator_meta(&code, query).await else {
            debug!("{} has no indicator metadata for {}", PROVIDER_NAME, code);
            return Ok(None);
        };

        let Some(observations) = self.observations(&code, query).await else {
            return Ok(None);
        };

        let mut data = collect_points(
            observations.iter().map(|o| (o.date.as_str(), &o.value)),
            None,
        );
        clip_to_range(&mut data, Frequency::Annual, query.start_date, query.end_date);
        if data.is_empty() {
            info!(
                "{} returned no usable observations for {}/{}",
                PROVIDER_NAME, query.country_code, code
            );
            return Ok(None);
        }

        let country_name = observations
            .first()
            .and_then(|o| o.country.as_ref())
            .and_then(|c| non_empty(c.value.clone()))
            .unwrap_or_else(|| query.country_code.clone());

        let mut metadata = Metadata::new();
        metadata.insert("indicator_id".to_string(), json!(code));
        metadata.insert("canonical_id".to_string(), json!(canonical));
        metadata.insert(
            "source_organization".to_string(),
            json!(meta.source_organization),
        );

        Ok(Some(IndicatorSeries {
            name: non_empty(meta.name).unwrap_or_else(|| canonical.clone()),
            category: Self::map_category(&canonical),
            description: non_empty(meta.source_note),
            unit: non_empty(meta.unit),
            frequency: Frequency::Annual,
            source: DataSource::WorldBank,
            country_code: query.country_code.clone(),
            country_name,
            data,
            last_updated: Utc::now(),
            metadata,
            indicator_id: code,
        }))
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorInfo>, ProviderError> {
        Ok(mapping_listing(INDICATOR_MAP))
    }

    async fn list_countries(&self) -> Result<Vec<CountryInfo>, ProviderError> {
        let request = FetchRequest::new(PROVIDER_NAME, format!("{}/country", self.base_url))
            .query("format", "json")
            .query("per_page", COUNTRIES_PER_PAGE);

        let rows: Vec<CountryRow> = self.fetch_rows(request).await?.unwrap_or_default();

        let countries: Vec<CountryInfo> = rows
            .into_iter()
            .filter_map(|row| {
                let region = non_empty(row.region.and_then(|r| r.value));
                if region.as_deref() == Some(AGGREGATES_REGION) {
                    return None;
                }
                Some(CountryInfo {
                    code: row.id,
                    name: row.name,
                    region,
                    income_level: non_empty(row.income_level.and_then(|i| i.value)),
                })
            })
            .collect();

        debug!("{} lists {} countries", PROVIDER_NAME, countries.len());
        Ok(countries)
    }
}
