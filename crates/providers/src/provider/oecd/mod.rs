//! OECD statistics provider (SDMX-JSON).
//!
//! Indicators map to a dataset plus a dimension key template in which
//! `{country}` is replaced by the ISO3 code, e.g. `QNA/{country}.B1_GE.CQRSA.Q`.
//! The adapter requests `{base}/{dataset}/{key}/all` and reads the first
//! series of the first data set.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use log::{debug, info, warn};
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

const BASE_URL: &str = "https://stats.oecd.org/sdmx-json/data";
const PROVIDER_NAME: &str = "OECD";
const COUNTRY_PLACEHOLDER: &str = "{country}";
const LOCATION_DIMENSION: &str = "LOCATION";
const UNIT_ATTRIBUTE: &str = "UNIT";

/// Canonical indicator -> `DATASET/KEY` template.
const INDICATOR_MAP: MappingTable = &[
    ("GDP", "QNA/{country}.B1_GE.CQRSA.Q"),
    ("GDP_GROWTH", "QNA/{country}.B1_GE.GPSA.Q"),
    ("INFLATION", "PRICES_CPI/{country}.CPALTT01.GY.M"),
    ("UNEMPLOYMENT", "STLABOUR/{country}.LRHUTTTT.STSA.M"),
    ("INTEREST_RATE", "MEI_FIN/IR3TIB.{country}.M"),
    ("GOVERNMENT_DEBT", "GOV_DEBT/{country}.GGDEBT.A"),
    ("CURRENT_ACCOUNT", "MEI_BOP6/B6BLTT02.{country}.STSA.Q"),
];

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::new(&["GDP"], IndicatorCategory::Gdp),
    CategoryRule::new(&["INFLATION", "CPI"], IndicatorCategory::Inflation),
    CategoryRule::new(&["UNEMPLOYMENT"], IndicatorCategory::Unemployment),
    CategoryRule::new(&["RATE"], IndicatorCategory::InterestRate),
    CategoryRule::new(&["DEBT"], IndicatorCategory::GovernmentDebt),
    CategoryRule::new(&["ACCOUNT"], IndicatorCategory::Trade),
];

/// OECD member states (ISO3, name).
pub const OECD_MEMBERS: &[(&str, &str)] = &[
    ("AUS", "Australia"),
    ("AUT", "Austria"),
    ("BEL", "Belgium"),
    ("CAN", "Canada"),
    ("CHL", "Chile"),
    ("COL", "Colombia"),
    ("CZE", "Czech Republic"),
    ("DNK", "Denmark"),
    ("EST", "Estonia"),
    ("FIN", "Finland"),
    ("FRA", "France"),
    ("DEU", "Germany"),
    ("GRC", "Greece"),
    ("HUN", "Hungary"),
    ("ISL", "Iceland"),
    ("IRL", "Ireland"),
    ("ISR", "Israel"),
    ("ITA", "Italy"),
    ("JPN", "Japan"),
    ("KOR", "South Korea"),
    ("LVA", "Latvia"),
    ("LTU", "Lithuania"),
    ("LUX", "Luxembourg"),
    ("MEX", "Mexico"),
    ("NLD", "Netherlands"),
    ("NZL", "New Zealand"),
    ("NOR", "Norway"),
    ("POL", "Poland"),
    ("PRT", "Portugal"),
    ("SVK", "Slovakia"),
    ("SVN", "Slovenia"),
    ("ESP", "Spain"),
    ("SWE", "Sweden"),
    ("CHE", "Switzerland"),
    ("TUR", "Turkey"),
    ("GBR", "United Kingdom"),
    ("USA", "United States"),
];

pub fn is_oecd_member(country_code: &str) -> bool {
    OECD_MEMBERS.iter().any(|(code, _)| *code == country_code)
}

fn member_name(country_code: &str) -> Option<&'static str> {
    OECD_MEMBERS
        .iter()
        .find(|(code, _)| *code == country_code)
        .map(|(_, name)| *name)
}

// ============================================================================
// SDMX-JSON response structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdmxMessage {
    #[serde(default)]
    data_sets: Vec<SdmxDataSet>,
    structure: Option<SdmxStructure>,
}

#[derive(Debug, Deserialize)]
struct SdmxDataSet {
    #[serde(default)]
    series: BTreeMap<String, SdmxSeries>,
}

#[derive(Debug, Deserialize)]
struct SdmxSeries {
    #[serde(default)]
    attributes: Vec<Option<usize>>,
    #[serde(default)]
    observations: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxStructure {
    name: Option<String>,
    #[serde(default)]
    dimensions: SdmxDimensions,
    #[serde(default)]
    attributes: SdmxAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxDimensions {
    #[serde(default)]
    series: Vec<SdmxComponent>,
    #[serde(default)]
    observation: Vec<SdmxComponent>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxAttributes {
    #[serde(default)]
    series: Vec<SdmxComponent>,
}

#[derive(Debug, Deserialize)]
struct SdmxComponent {
    id: String,
    #[serde(default)]
    values: Vec<SdmxValue>,
}

#[derive(Debug, Deserialize)]
struct SdmxValue {
    id: String,
    name: Option<String>,
}

impl SdmxComponent {
    fn value_at(&self, index: usize) -> Option<&SdmxValue> {
        self.values.get(index)
    }
}

/// Split a mapping entry into `(dataset, key)` with the country substituted.
fn dataset_and_key(native: &str, country_code: &str) -> (String, String) {
    match native.split_once('/') {
        Some((dataset, key)) => (
            dataset.to_string(),
            key.replace(COUNTRY_PLACEHOLDER, country_code),
        ),
        None => (native.to_string(), country_code.to_string()),
    }
}

/// `2020-Q3` -> `2020-07`; other period ids are returned unchanged.
fn normalize_period(period: &str) -> String {
    if let Some((year, quarter)) = period.split_once("-Q") {
        if let Ok(q @ 1..=4) = quarter.parse::<u32>() {
            return format!("{}-{:02}", year, (q - 1) * 3 + 1);
        }
    }
    period.to_string()
}

fn frequency_from_period(period: &str) -> Frequency {
    if period.contains("-Q") {
        Frequency::Quarterly
    } else if period.len() == 4 {
        Frequency::Annual
    } else if period.len() == 7 {
        Frequency::Monthly
    } else {
        Frequency::Daily
    }
}

/// OECD indicator provider.
pub struct OecdProvider {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl OecdProvider {
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

    async fn fetch_message(
        &self,
        dataset: &str,
        key: &str,
        query: &IndicatorQuery,
    ) -> Option<SdmxMessage> {
        let mut request = FetchRequest::new(
            PROVIDER_NAME,
            format!(
                "{}/{}/{}/all",
                self.base_url,
                urlencoding::encode(dataset),
                urlencoding::encode(key)
            ),
        )
        .deadline(query.deadline);

        if let Some(start) = query.start_date {
            request = request.query("startTime", start.year());
        }
        if let Some(end) = query.end_date {
            request = request.query("endTime", end.year());
        }

        let url = request.url().to_string();
        let body = match self.fetcher.fetch_json(request).await {
            Ok(body) => body,
            Err(e) => {
                warn!("{} request failed for {}: {}", PROVIDER_NAME, url, e);
                return None;
            }
        };
        match serde_json::from_value(body) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Unexpected {} payload from {}: {}", PROVIDER_NAME, url, e);
                None
            }
        }
    }
}

/// Position-indexed lookup of the component value a series key points at.
fn series_dimension_value<'a>(
    structure: &'a SdmxStructure,
    series_key: &str,
    dimension_id: &str,
) -> Option<&'a SdmxValue> {
    let position = structure
        .dimensions
        .series
        .iter()
        .position(|d| d.id == dimension_id)?;
    let index = series_key
        .split(':')
        .nth(position)
        .and_then(|i| i.parse::<usize>().ok())
        .unwrap_or(0);
    structure.dimensions.series[position].value_at(index)
}

fn series_unit(structure: &SdmxStructure, series: &SdmxSeries) -> Option<String> {
    let position = structure
        .attributes
        .series
        .iter()
        .position(|a| a.id == UNIT_ATTRIBUTE)?;
    let index = series.attributes.get(position).copied().flatten()?;
    let value = structure.attributes.series[position].value_at(index)?;
    Some(value.name.clone().unwrap_or_else(|| value.id.clone()))
}

#[async_trait]
impl IndicatorProvider for OecdProvider {
    fn source(&self) -> DataSource {
        DataSource::Oecd
    }

    async fn get_indicator(
        &self,
        query: &IndicatorQuery,
    ) -> Result<Option<IndicatorSeries>, ProviderError> {
        let (canonical, native) = resolve_native_code(INDICATOR_MAP, &query.indicator_id);
        let (dataset, key) = dataset_and_key(&native, &query.country_code);

        let Some(message) = self.fetch_message(&dataset, &key, query).await else {
            return Ok(None);
        };
        let structure = message.structure.unwrap_or_default();

        let Some((series_key, series)) = message
            .data_sets
            .into_iter()
            .next()
            .and_then(|set| set.series.into_iter().next())
        else {
            debug!("{} returned no series for {}/{}", PROVIDER_NAME, dataset, key);
            return Ok(None);
        };

        let Some(periods) = structure.dimensions.observation.first() else {
            warn!("{} response for {} has no time dimension", PROVIDER_NAME, dataset);
            return Ok(None);
        };

        let unit = series_unit(&structure, &series);

        let raw: Vec<(String, &Value)> = series
            .observations
            .iter()
            .filter_map(|(index, values)| {
                let period = periods.value_at(index.parse::<usize>().ok()?)?;
                Some((normalize_period(&period.id), values.first()?))
            })
            .collect();

        let frequency = periods
            .values
            .first()
            .map(|p| frequency_from_period(&p.id))
            .unwrap_or(Frequency::Annual);

        let mut data = collect_points(raw.iter().map(|(d, v)| (d.as_str(), *v)), unit.as_deref());
        clip_to_range(&mut data, frequency, query.start_date, query.end_date);
        if data.is_empty() {
            info!(
                "{} returned no usable observations for {}/{}",
                PROVIDER_NAME, dataset, key
            );
            return Ok(None);
        }

        let country_name = series_dimension_value(&structure, &series_key, LOCATION_DIMENSION)
            .and_then(|v| v.name.clone())
            .or_else(|| member_name(&query.country_code).map(str::to_string))
            .unwrap_or_else(|| query.country_code.clone());

        let mut metadata = Metadata::new();
        metadata.insert("dataset".to_string(), json!(dataset));
        metadata.insert("series_key".to_string(), json!(key));
        metadata.insert("canonical_id".to_string(), json!(canonical));

        Ok(Some(IndicatorSeries {
            indicator_id: format!("{}/{}", dataset, key),
            name: structure.name.clone().unwrap_or_else(|| canonical.clone()),
            category: Self::map_category(&canonical),
            description: None,
            unit,
            frequency,
            source: DataSource::Oecd,
            country_code: query.country_code.clone(),
            country_name,
            data,
            last_updated: Utc::now(),
            metadata,
        }))
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorInfo>, ProviderError> {
        Ok(mapping_listing(INDICATOR_MAP))
    }

    async fn list_countries(&self) -> Result<Vec<CountryInfo>, ProviderError> {
        Ok(OECD_MEMBERS
            .iter()
            .map(|(code, name)| CountryInfo::new(code, name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::NaiveDate;

    use super::*;
    use crate::settings::ProviderSettings;
    use crate::test_support::spawn_stub;

    fn fetcher() -> Arc<HttpFetcher> {
        Arc::new(HttpFetcher::new(&ProviderSettings {
            request_timeout: Duration::from_secs(5),
            max_retries: 1,
            retry_delay: Duration::from_millis(1),
            ..ProviderSettings::default()
        }))
    }

    fn qna_message() -> Value {
        json!({
            "header": {"id": "qna"},
            "dataSets": [{
                "action": "Information",
                "series": {
                    "0:0:0:0": {
                        "attributes": [0, null],
                        "observations": {
                            "0": [905000.5, null],
                            "2": [912000.0, null],
                            "1": ["NaN", null],
                            "3": [918500.25, null]
                        }
                    }
                }
            }],
            "structure": {
                "name": "Quarterly National Accounts",
                "dimensions": {
                    "series": [
                        {"id": "LOCATION", "values": [{"id": "DEU", "name": "Germany"}]},
                        {"id": "SUBJECT", "values": [{"id": "B1_GE", "name": "GDP"}]},
                        {"id": "MEASURE", "values": [{"id": "CQRSA", "name": "Current prices"}]},
                        {"id": "FREQUENCY", "values": [{"id": "Q", "name": "Quarterly"}]}
                    ],
                    "observation": [{
                        "id": "TIME_PERIOD",
                        "values": [
                            {"id": "2022-Q4", "name": "Q4-2022"},
                            {"id": "2023-Q1", "name": "Q1-2023"},
                            {"id": "2023-Q2", "name": "Q2-2023"},
                            {"id": "2023-Q3", "name": "Q3-2023"}
                        ]
                    }]
                },
                "attributes": {
                    "series": [
                        {"id": "UNIT", "values": [{"id": "EUR", "name": "Euro"}]},
                        {"id": "POWERCODE", "values": [{"id": "6", "name": "Millions"}]}
                    ]
                }
            }
        })
    }

    fn oecd_stub(seen: Arc<Mutex<Vec<String>>>) -> Router {
        Router::new().route(
            "/{dataset}/{key}/all",
            get(
                move |Path((dataset, key)): Path<(String, String)>,
                      Query(params): Query<HashMap<String, String>>| {
                    let seen = seen.clone();
                    async move {
                        seen.lock().unwrap().push(format!(
                            "{}/{}?{}",
                            dataset,
                            key,
                            params.get("startTime").cloned().unwrap_or_default()
                        ));
                        if dataset == "QNA" {
                            Json(qna_message())
                        } else {
                            Json(json!({"dataSets": [{"series": {}}], "structure": {}}))
                        }
                    }
                },
            ),
        )
    }

    #[tokio::test]
    async fn test_get_indicator_reads_first_series() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_stub(oecd_stub(seen.clone())).await;
        let provider = OecdProvider::new(fetcher()).with_base_url(base);

        let query = IndicatorQuery::new("gdp", "deu")
            .with_range(NaiveDate::from_ymd_opt(2022, 1, 1), None);
        let series = provider.get_indicator(&query).await.unwrap().unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["QNA/DEU.B1_GE.CQRSA.Q?2022"]
        );
        assert_eq!(series.indicator_id, "QNA/DEU.B1_GE.CQRSA.Q");
        assert_eq!(series.name, "Quarterly National Accounts");
        assert_eq!(series.source, DataSource::Oecd);
        assert_eq!(series.category, IndicatorCategory::Gdp);
        assert_eq!(series.frequency, Frequency::Quarterly);
        assert_eq!(series.country_name, "Germany");
        assert_eq!(series.unit.as_deref(), Some("Euro"));

        let dates: Vec<_> = series.data.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2022, 10, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            ]
        );
        assert_eq!(series.values(), vec![905000.5, 912000.0, 918500.25]);
    }

    #[tokio::test]
    async fn test_end_date_clips_observations() {
        let base = spawn_stub(oecd_stub(Arc::new(Mutex::new(Vec::new())))).await;
        let provider = OecdProvider::new(fetcher()).with_base_url(base);

        let query = IndicatorQuery::new("GDP", "DEU")
            .with_range(None, NaiveDate::from_ymd_opt(2023, 5, 15));
        let series = provider.get_indicator(&query).await.unwrap().unwrap();

        assert_eq!(series.data.len(), 2);
        assert_eq!(
            series.latest().map(|p| p.date),
            NaiveDate::from_ymd_opt(2023, 4, 1)
        );
    }

    #[tokio::test]
    async fn test_empty_data_set_reports_no_data() {
        let base = spawn_stub(oecd_stub(Arc::new(Mutex::new(Vec::new())))).await;
        let provider = OecdProvider::new(fetcher()).with_base_url(base);

        let result = provider
            .get_indicator(&IndicatorQuery::new("UNEMPLOYMENT", "FRA"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_reports_no_data() {
        let provider = OecdProvider::new(fetcher()).with_base_url("http://127.0.0.1:1");

        let result = provider
            .get_indicator(&IndicatorQuery::new("GDP", "DEU"))
            .await;

        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_dataset_and_key() {
        assert_eq!(
            dataset_and_key("MEI_FIN/IR3TIB.{country}.M", "JPN"),
            ("MEI_FIN".to_string(), "IR3TIB.JPN.M".to_string())
        );
        assert_eq!(
            dataset_and_key("HEALTH_STAT", "JPN"),
            ("HEALTH_STAT".to_string(), "JPN".to_string())
        );
    }

    #[test]
    fn test_normalize_period() {
        assert_eq!(normalize_period("2020-Q1"), "2020-01");
        assert_eq!(normalize_period("2020-Q4"), "2020-10");
        assert_eq!(normalize_period("2020-Q5"), "2020-Q5");
        assert_eq!(normalize_period("2020-03"), "2020-03");
        assert_eq!(frequency_from_period("2020-03"), Frequency::Monthly);
        assert_eq!(frequency_from_period("2020"), Frequency::Annual);
    }

    #[test]
    fn test_category_rules() {
        assert_eq!(
            OecdProvider::map_category("CURRENT_ACCOUNT"),
            IndicatorCategory::Trade
        );
        assert_eq!(
            OecdProvider::map_category("INTEREST_RATE"),
            IndicatorCategory::InterestRate
        );
    }

    #[tokio::test]
    async fn test_members() {
        let provider = OecdProvider::new(fetcher());
        let countries = provider.list_countries().await.unwrap();
        assert_eq!(countries.len(), 37);
        assert!(is_oecd_member("USA"));
        assert!(is_oecd_member("KOR"));
        assert!(!is_oecd_member("BRA"));
    }
}
