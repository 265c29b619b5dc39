use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::category::IndicatorCategory;
use super::source::DataSource;

/// Free-form per-source metadata attached to a series.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Observation cadence of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Map an upstream frequency label ("Monthly", "Weekly, Ending Friday", "A", ...).
    ///
    /// Unknown labels return `None`; callers pick their own default.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        let frequency = match label.as_str() {
            "d" => Frequency::Daily,
            "w" => Frequency::Weekly,
            "m" => Frequency::Monthly,
            "q" => Frequency::Quarterly,
            "a" => Frequency::Annual,
            _ if label.starts_with("daily") => Frequency::Daily,
            _ if label.starts_with("weekly") => Frequency::Weekly,
            _ if label.starts_with("monthly") => Frequency::Monthly,
            _ if label.starts_with("quarterly") => Frequency::Quarterly,
            _ if label.starts_with("annual") => Frequency::Annual,
            _ => return None,
        };
        Some(frequency)
    }
}

/// A single dated observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,

    /// Always finite.
    pub value: f64,

    /// Unit override for this point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            unit: None,
        }
    }
}

/// Canonical normalized indicator time series.
///
/// Every provider adapter produces this shape. `data` is sorted ascending
/// by date and holds only finite values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    /// Native indicator code that produced this series
    pub indicator_id: String,

    /// Human-readable name
    pub name: String,

    pub category: IndicatorCategory,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit of measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub frequency: Frequency,

    pub source: DataSource,

    /// ISO 3166-1 alpha-3
    pub country_code: String,

    pub country_name: String,

    pub data: Vec<DataPoint>,

    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl IndicatorSeries {
    /// True when the series carries no observations.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&DataPoint> {
        self.data.last()
    }

    /// Observation values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|point| point.value).collect()
    }
}
