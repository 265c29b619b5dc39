//! Per-country source preference.

use crate::models::DataSource;
use crate::provider::oecd::is_oecd_member;

const DOMESTIC_COUNTRY: &str = "USA";

/// Order in which sources are asked for a country.
///
/// - USA: FRED, World Bank, OECD
/// - other OECD members: OECD, World Bank, FRED
/// - everyone else: World Bank, OECD, FRED
///
/// Every source appears exactly once; disabled sources are filtered by the caller.
pub fn preference_order(country_code: &str) -> [DataSource; 3] {
    let country = country_code.trim().to_ascii_uppercase();

    if country == DOMESTIC_COUNTRY {
        [DataSource::Fred, DataSource::WorldBank, DataSource::Oecd]
    } else if is_oecd_member(&country) {
        [DataSource::Oecd, DataSource::WorldBank, DataSource::Fred]
    } else {
        [DataSource::WorldBank, DataSource::Oecd, DataSource::Fred]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domestic_first_for_usa() {
        assert_eq!(
            preference_order("USA"),
            [DataSource::Fred, DataSource::WorldBank, DataSource::Oecd]
        );
        assert_eq!(preference_order("usa"), preference_order("USA"));
    }

    #[test]
    fn test_oecd_first_for_members() {
        for country in ["DEU", "JPN", "KOR", "COL", "GBR"] {
            assert_eq!(preference_order(country)[0], DataSource::Oecd, "{}", country);
        }
    }

    #[test]
    fn test_world_bank_first_otherwise() {
        for country in ["BRA", "IND", "KEN", "CHN"] {
            assert_eq!(
                preference_order(country),
                [DataSource::WorldBank, DataSource::Oecd, DataSource::Fred]
            );
        }
    }

    #[test]
    fn test_every_source_appears_once() {
        for country in ["USA", "FRA", "ZAF"] {
            let mut order = preference_order(country).to_vec();
            order.sort();
            assert_eq!(order, DataSource::ALL.to_vec());
        }
    }
}
