/// Default lookback when a query has no start date (5 years)
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365 * 5;

/// Lookback for the economic summary
pub const SUMMARY_LOOKBACK_DAYS: i64 = 365;

/// Indicators reported by the economic summary, in display order
pub const SUMMARY_INDICATORS: [&str; 5] = [
    "GDP",
    "INFLATION",
    "UNEMPLOYMENT",
    "INTEREST_RATE",
    "GOVERNMENT_DEBT",
];

/// Countries allowed in one comparison
pub const MIN_COMPARE_COUNTRIES: usize = 2;
pub const MAX_COMPARE_COUNTRIES: usize = 10;

/// Calculations run when a request names none
pub const DEFAULT_CALCULATIONS: [&str; 6] = ["mean", "median", "std", "min", "max", "trend"];

/// Decimal places kept for correlation coefficients in reports
pub const CORRELATION_DECIMALS: i32 = 4;
