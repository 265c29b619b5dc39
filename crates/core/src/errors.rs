//! Error types for the query surface.

use thiserror::Error;

use crate::analytics::AnalyticsError;

/// Type alias for Result using [`ServiceError`].
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced to callers of the indicator service.
///
/// Upstream failures never appear here: the provider manager absorbs them
/// and only reports exhaustion, which becomes [`ServiceError::NotFound`].
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No enabled source had data for the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request is malformed (country count, date range, codes).
    #[error("Input validation failed: {0}")]
    Validation(String),

    /// An analytics computation could not run on the fetched data.
    #[error("Analytics failed: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
