//! Static groupings of indicator codes and countries.

use std::collections::BTreeMap;

use super::indicators_model::{CategoryGroup, CategoryListing, Region, RegionListing};

const CATEGORIES: &[(&str, CategoryGroup)] = &[
    (
        "macroeconomic",
        CategoryGroup {
            name: "Macroeconomic Indicators",
            indicators: &["GDP", "GDP_GROWTH", "GDP_PER_CAPITA", "GNP"],
        },
    ),
    (
        "prices",
        CategoryGroup {
            name: "Inflation & Prices",
            indicators: &["INFLATION", "CPI", "PPI", "CORE_INFLATION"],
        },
    ),
    (
        "labor",
        CategoryGroup {
            name: "Labor Market",
            indicators: &["UNEMPLOYMENT", "EMPLOYMENT", "LABOR_FORCE", "WAGES"],
        },
    ),
    (
        "monetary",
        CategoryGroup {
            name: "Monetary Policy",
            indicators: &["INTEREST_RATE", "MONEY_SUPPLY", "M2", "CENTRAL_BANK_RATE"],
        },
    ),
    (
        "fiscal",
        CategoryGroup {
            name: "Fiscal Policy",
            indicators: &["GOVERNMENT_DEBT", "BUDGET_BALANCE", "GOVERNMENT_REVENUE"],
        },
    ),
    (
        "trade",
        CategoryGroup {
            name: "International Trade",
            indicators: &["EXPORTS", "IMPORTS", "CURRENT_ACCOUNT", "TRADE_BALANCE"],
        },
    ),
    (
        "financial",
        CategoryGroup {
            name: "Financial Markets",
            indicators: &["STOCK_INDEX", "BOND_YIELD", "EXCHANGE_RATE"],
        },
    ),
    (
        "confidence",
        CategoryGroup {
            name: "Business & Consumer",
            indicators: &["CONSUMER_CONFIDENCE", "BUSINESS_CONFIDENCE", "PMI"],
        },
    ),
];

const REGIONS: &[Region] = &[
    Region {
        name: "North America",
        countries: &["USA", "CAN", "MEX"],
    },
    Region {
        name: "Europe",
        countries: &["GBR", "DEU", "FRA", "ITA", "ESP", "NLD", "BEL", "SWE", "NOR", "DNK"],
    },
    Region {
        name: "Asia",
        countries: &["CHN", "JPN", "KOR", "IND", "IDN", "THA", "SGP", "MYS"],
    },
    Region {
        name: "Oceania",
        countries: &["AUS", "NZL"],
    },
    Region {
        name: "South America",
        countries: &["BRA", "ARG", "CHL", "COL", "PER"],
    },
    Region {
        name: "Africa",
        countries: &["ZAF", "NGA", "EGY", "KEN", "GHA"],
    },
    Region {
        name: "Middle East",
        countries: &["SAU", "ARE", "ISR", "TUR", "IRN"],
    },
];

pub fn categories() -> CategoryListing {
    let categories: BTreeMap<_, _> = CATEGORIES
        .iter()
        .map(|(key, group)| (*key, group.clone()))
        .collect();
    CategoryListing {
        total_categories: categories.len(),
        categories,
    }
}

pub fn regions() -> RegionListing {
    RegionListing {
        regions: REGIONS.to_vec(),
        total: REGIONS.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let listing = categories();
        assert_eq!(listing.total_categories, 8);
        assert!(listing.categories["monetary"].indicators.contains(&"M2"));
    }

    #[test]
    fn test_regions_do_not_overlap() {
        let listing = regions();
        let mut seen = std::collections::HashSet::new();
        for region in &listing.regions {
            for country in region.countries {
                assert!(seen.insert(*country), "{} listed twice", country);
            }
        }
        assert_eq!(listing.total, 7);
    }
}
