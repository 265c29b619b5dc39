//! Analytics over indicator series.
//!
//! - [`summarize`]: descriptive statistics over a value list
//! - [`trend`]: least-squares line against index position
//! - [`correlate`]: Pearson correlation of two series joined on exact date

mod correlation;
mod statistics;
mod trend;

use thiserror::Error;

pub use correlation::{correlate, Correlation, CorrelationDirection, CorrelationStrength};
pub use statistics::{summarize, Calculation, Statistics};
pub use trend::{trend, TrendAnalysis, TrendDirection};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Too few points (or overlapping dates) for the computation.
    #[error("Insufficient data for {operation}: need at least {required} points, got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },
}
