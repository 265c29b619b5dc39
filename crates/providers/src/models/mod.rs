//! Indicator data models
//!
//! This module contains the core data types for indicator operations:
//! - `source` - Upstream source tags (DataSource)
//! - `category` - Indicator categories and the substring classification rules
//! - `series` - The canonical normalized series (IndicatorSeries, DataPoint, Frequency)
//! - `query` - Request parameters for a single indicator lookup (IndicatorQuery)
//! - `listing` - Indicator and country listing entries
//! - `dates` - Tolerant parsing of upstream observation dates

mod category;
mod dates;
mod listing;
mod query;
mod series;
mod source;

pub use category::{classify_category, CategoryRule, IndicatorCategory};
pub use dates::parse_observation_date;
pub use listing::{CountryInfo, IndicatorInfo};
pub use query::IndicatorQuery;
pub use series::{DataPoint, Frequency, IndicatorSeries, Metadata};
pub use source::{DataSource, ParseSourceError};
