//! Shared normalization helpers for provider adapters.

use chrono::{Days, Months, NaiveDate};
use log::debug;
use serde_json::Value;

use crate::models::{parse_observation_date, DataPoint, Frequency, IndicatorInfo};

/// Canonical code -> provider-native code.
pub type MappingTable = &'static [(&'static str, &'static str)];

/// Resolve a caller-supplied indicator code against a mapping table.
///
/// Lookup is case-insensitive. Codes missing from the table are passed
/// through unchanged as a best-effort native code.
///
/// Returns `(canonical, native)` where `canonical` is the upper-cased input.
pub fn resolve_native_code(table: MappingTable, indicator_id: &str) -> (String, String) {
    let canonical = indicator_id.trim().to_ascii_uppercase();
    let native = table
        .iter()
        .find(|(code, _)| *code == canonical)
        .map(|(_, native)| native.to_string())
        .unwrap_or_else(|| indicator_id.trim().to_string());
    (canonical, native)
}

/// Listing entries for every row of a mapping table.
pub(crate) fn mapping_listing(table: MappingTable) -> Vec<IndicatorInfo> {
    table
        .iter()
        .map(|(code, native)| IndicatorInfo::from_mapping(code, native))
        .collect()
}

/// Extract a finite number from an upstream value.
///
/// Accepts JSON numbers and numeric strings. Sentinels such as `"."`,
/// `null`, empty strings and non-finite numbers yield `None`.
pub fn parse_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Build a date-sorted point list from raw `(date, value)` pairs.
///
/// Pairs whose value is not numeric are skipped; pairs whose date cannot
/// be parsed are logged (by the date parser) and skipped.
pub fn collect_points<'a, I>(raw: I, unit: Option<&str>) -> Vec<DataPoint>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut skipped = 0usize;
    let mut points: Vec<DataPoint> = raw
        .into_iter()
        .filter_map(|(date, value)| {
            let parsed = parse_value(value)
                .and_then(|v| parse_observation_date(date).map(|d| (d, v)));
            if parsed.is_none() {
                skipped += 1;
            }
            parsed
        })
        .map(|(date, value)| DataPoint {
            date,
            value,
            unit: unit.map(str::to_string),
        })
        .collect();

    if skipped > 0 {
        debug!("Dropped {} unusable observations", skipped);
    }

    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

/// Last day of the period a point stands for; point dates mark period starts.
fn period_end(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    let months = match frequency {
        Frequency::Daily => return date,
        Frequency::Weekly => return date.checked_add_days(Days::new(6)).unwrap_or(date),
        Frequency::Monthly => 1,
        Frequency::Quarterly => 3,
        Frequency::Annual => 12,
    };
    date.checked_add_months(Months::new(months))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Drop points whose period lies outside `[start, end]`.
///
/// Upstreams filter at different granularities (World Bank and OECD by
/// year, FRED by day), so every adapter clips its result the same way. A
/// point is kept when its period overlaps the range: an annual point dated
/// `2021-01-01` survives a range starting `2021-10-16`.
pub fn clip_to_range(
    points: &mut Vec<DataPoint>,
    frequency: Frequency,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) {
    let before = points.len();
    points.retain(|p| {
        start.map_or(true, |start| period_end(p.date, frequency) >= start)
            && end.map_or(true, |end| p.date <= end)
    });

    if points.len() < before {
        debug!("Clipped {} observations outside the requested range", before - points.len());
    }
}
