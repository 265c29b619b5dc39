use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream statistics service a series was fetched from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Federal Reserve Economic Data (US only)
    Fred,
    /// World Bank Open Data
    WorldBank,
    /// OECD statistics (SDMX-JSON)
    Oecd,
}

/// Returned when a source tag string is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown data source: {0}")]
pub struct ParseSourceError(pub String);

impl DataSource {
    /// Every known source, in declaration order.
    pub const ALL: [DataSource; 3] = [DataSource::Fred, DataSource::WorldBank, DataSource::Oecd];

    /// Wire tag, e.g. `"world_bank"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Fred => "fred",
            DataSource::WorldBank => "world_bank",
            DataSource::Oecd => "oecd",
        }
    }

    /// Human-readable name used in log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            DataSource::Fred => "FRED",
            DataSource::WorldBank => "World Bank",
            DataSource::Oecd => "OECD",
        }
    }

    /// Parse a caller-supplied source selector.
    ///
    /// `"all"` (or an empty string) selects every source and yields `None`.
    pub fn parse_selector(value: &str) -> Result<Option<DataSource>, ParseSourceError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fred" => Ok(DataSource::Fred),
            "world_bank" | "worldbank" => Ok(DataSource::WorldBank),
            "oecd" => Ok(DataSource::Oecd),
            _ => Err(ParseSourceError(s.to_string())),
        }
    }
}
