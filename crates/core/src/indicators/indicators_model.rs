//! Request and response models for the indicator query surface.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use econdata_providers::{CountryInfo, DataSource, IndicatorInfo, IndicatorSeries};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analytics::{
    Calculation, Correlation, CorrelationDirection, CorrelationStrength, Statistics, TrendAnalysis,
};
use crate::constants::DEFAULT_CALCULATIONS;

/// Deserialize a source selector where `"all"` (or nothing) means no preference.
pub fn deserialize_source_selector<'de, D>(deserializer: D) -> Result<Option<DataSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => DataSource::parse_selector(&value).map_err(serde::de::Error::custom),
    }
}

/// Inclusive date window of a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct IndicatorRequest {
    pub indicator: String,
    pub country: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_source_selector")]
    pub source: Option<DataSource>,
}

impl IndicatorRequest {
    pub fn new(indicator: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            country: country.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CompareRequest {
    pub indicator: String,
    pub countries: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_source_selector")]
    pub source: Option<DataSource>,
}

/// One indicator across several countries.
#[derive(Clone, Debug, Serialize)]
pub struct Comparison {
    pub indicator: String,
    pub indicator_name: String,
    /// Countries without data are left out
    pub countries: BTreeMap<String, IndicatorSeries>,
    pub comparison_period: Period,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CalculationRequest {
    pub indicator: String,
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Unset runs the default set, where a trend is skipped on short series
    #[serde(default)]
    pub calculations: Option<Vec<String>>,
}

impl CalculationRequest {
    pub fn requested(&self) -> Vec<Calculation> {
        match &self.calculations {
            Some(names) => Calculation::parse_list(names),
            None => Calculation::parse_list(&DEFAULT_CALCULATIONS[..]),
        }
    }

    /// Whether the caller named the calculations itself.
    pub fn is_explicit(&self) -> bool {
        self.calculations.is_some()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsReport {
    pub indicator: String,
    pub country: String,
    pub period: Period,
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendAnalysis>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CorrelationRequest {
    pub indicator1: String,
    pub indicator2: String,
    pub country: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndicatorRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Interpretation {
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub indicator1: IndicatorRef,
    pub indicator2: IndicatorRef,
    pub country: String,
    pub period: Period,
    /// Pearson coefficient rounded to 4 decimals
    pub correlation: f64,
    pub interpretation: Interpretation,
    pub data_points: usize,
}

impl CorrelationReport {
    pub(crate) fn new(
        indicator1: IndicatorRef,
        indicator2: IndicatorRef,
        country: String,
        period: Period,
        correlation: &Correlation,
        decimals: i32,
    ) -> Self {
        let scale = 10f64.powi(decimals);
        Self {
            indicator1,
            indicator2,
            country,
            period,
            correlation: (correlation.coefficient * scale).round() / scale,
            interpretation: Interpretation {
                strength: correlation.strength,
                direction: correlation.direction,
                description: correlation.description(),
            },
            data_points: correlation.data_points,
        }
    }
}

/// Latest observation of one indicator in the economic summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub date: NaiveDate,
    pub source: DataSource,
}

#[derive(Clone, Debug, Serialize)]
pub struct EconomicSummary {
    pub country: String,
    pub as_of: DateTime<Utc>,
    pub indicators: BTreeMap<String, SummaryEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndicatorListing {
    pub sources: Vec<DataSource>,
    pub indicators: BTreeMap<DataSource, Vec<IndicatorInfo>>,
    pub total: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CountryListing {
    pub sources: BTreeMap<DataSource, Vec<CountryInfo>>,
    pub total_unique_countries: usize,
    pub total_entries: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub name: &'static str,
    pub indicators: &'static [&'static str],
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryListing {
    pub categories: BTreeMap<&'static str, CategoryGroup>,
    pub total_categories: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: &'static str,
    pub countries: &'static [&'static str],
}

#[derive(Clone, Debug, Serialize)]
pub struct RegionListing {
    pub regions: Vec<Region>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_source_selector_accepts_all() {
        let request: CompareRequest = serde_json::from_value(json!({
            "indicator": "GDP",
            "countries": ["USA", "GBR"],
            "source": "all"
        }))
        .unwrap();
        assert_eq!(request.source, None);

        let request: IndicatorRequest = serde_json::from_value(json!({
            "indicator": "GDP",
            "country": "USA",
            "source": "world_bank"
        }))
        .unwrap();
        assert_eq!(request.source, Some(DataSource::WorldBank));
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let result: Result<IndicatorRequest, _> = serde_json::from_value(json!({
            "indicator": "GDP",
            "country": "USA",
            "source": "imf"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_calculations_default() {
        let request: CalculationRequest = serde_json::from_value(json!({
            "indicator": "GDP_GROWTH",
            "country": "USA",
            "start_date": "2020-01-01",
            "end_date": "2024-01-01"
        }))
        .unwrap();
        assert!(!request.is_explicit());
        assert_eq!(
            request.requested(),
            vec![
                Calculation::Mean,
                Calculation::Median,
                Calculation::Std,
                Calculation::Min,
                Calculation::Max,
                Calculation::Trend
            ]
        );

        let named: CalculationRequest = serde_json::from_value(json!({
            "indicator": "GDP_GROWTH",
            "country": "USA",
            "start_date": "2020-01-01",
            "end_date": "2024-01-01",
            "calculations": ["max"]
        }))
        .unwrap();
        assert!(named.is_explicit());
        assert_eq!(named.requested(), vec![Calculation::Max]);
    }
}
