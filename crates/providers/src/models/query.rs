use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Parameters for a single indicator lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorQuery {
    /// Canonical indicator code (e.g. "GDP", "UNEMPLOYMENT") or a native code
    pub indicator_id: String,

    /// ISO 3166-1 alpha-3
    pub country_code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Caller deadline threaded down to every upstream call made for this query
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl IndicatorQuery {
    /// Query without a date range. Codes are upper-cased.
    pub fn new(indicator_id: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            indicator_id: indicator_id.into().trim().to_ascii_uppercase(),
            country_code: country_code.into().trim().to_ascii_uppercase(),
            start_date: None,
            end_date: None,
            deadline: None,
        }
    }

    pub fn with_range(mut self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
