use serde::{Deserialize, Serialize};

/// Closed set of indicator categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Gdp,
    Inflation,
    Unemployment,
    InterestRate,
    GovernmentDebt,
    Trade,
    MoneySupply,
    Confidence,
    Manufacturing,
    Retail,
    Housing,
    Currency,
}

/// One classification rule: any token found in the indicator code selects the category.
#[derive(Clone, Copy, Debug)]
pub struct CategoryRule {
    pub tokens: &'static [&'static str],
    pub category: IndicatorCategory,
}

impl CategoryRule {
    pub const fn new(tokens: &'static [&'static str], category: IndicatorCategory) -> Self {
        Self { tokens, category }
    }
}

/// Classify an indicator code against an ordered rule table.
///
/// Matching is a case-insensitive substring search; the first matching rule
/// wins, so the table order encodes priority. Codes matching nothing fall
/// back to [`IndicatorCategory::Gdp`].
pub fn classify_category(indicator_code: &str, rules: &[CategoryRule]) -> IndicatorCategory {
    let code = indicator_code.to_ascii_uppercase();
    rules
        .iter()
        .find(|rule| rule.tokens.iter().any(|token| code.contains(token)))
        .map(|rule| rule.category)
        .unwrap_or(IndicatorCategory::Gdp)
}
