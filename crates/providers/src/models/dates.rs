use chrono::NaiveDate;
use log::warn;

/// Parse an upstream observation date.
///
/// Accepted shapes, tried in order: `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD`,
/// `YYYY-MM`, `YYYY/MM`, `YYYY`. Month and year precision dates resolve to
/// the first day of the period. Anything else is logged and yields `None`;
/// callers drop the observation instead of inventing a date.
pub fn parse_observation_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();

    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y/%m/%d").ok())
        .or_else(|| parse_compact(value))
        .or_else(|| parse_year_month(value, '-'))
        .or_else(|| parse_year_month(value, '/'))
        .or_else(|| parse_year(value));

    if parsed.is_none() {
        warn!("Could not parse date: {}", raw);
    }
    parsed
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYYMMDD`
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !all_digits(value) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY-MM` / `YYYY/MM`
fn parse_year_month(value: &str, separator: char) -> Option<NaiveDate> {
    let (year, month) = value.split_once(separator)?;
    if year.len() != 4 || !all_digits(year) || month.len() > 2 || !all_digits(month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// `YYYY`
fn parse_year(value: &str) -> Option<NaiveDate> {
    if value.len() != 4 || !all_digits(value) {
        return None;
    }
    NaiveDate::from_ymd_opt(value.parse().ok()?, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_accepted_shapes() {
        assert_eq!(parse_observation_date("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_observation_date("2024/03/15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_observation_date("20240315"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_observation_date("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_observation_date("2024/03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_observation_date("2024"), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_observation_date(" 2023 "), Some(ymd(2023, 1, 1)));
    }

    #[test]
    fn test_unparseable_dates_are_rejected_not_defaulted() {
        assert_eq!(parse_observation_date(""), None);
        assert_eq!(parse_observation_date("."), None);
        assert_eq!(parse_observation_date("2024Q1"), None);
        assert_eq!(parse_observation_date("2024-13"), None);
        assert_eq!(parse_observation_date("2024-02-30"), None);
        assert_eq!(parse_observation_date("15/03/2024"), None);
    }
}
