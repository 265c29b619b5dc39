//! Indicator provider trait definitions.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{CountryInfo, DataSource, IndicatorInfo, IndicatorQuery, IndicatorSeries};

/// Trait for upstream indicator sources.
///
/// Implement this trait to add a new statistics service. The manager keys
/// providers by [`source`](Self::source) and decides the order in which
/// they are asked.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use econdata_providers::provider::IndicatorProvider;
///
/// struct ImfProvider {
///     fetcher: Arc<HttpFetcher>,
/// }
///
/// #[async_trait]
/// impl IndicatorProvider for ImfProvider {
///     fn source(&self) -> DataSource {
///         DataSource::Imf
///     }
///
///     // ... implement get_indicator and the listings
/// }
/// ```
#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    /// Source tag for this provider.
    ///
    /// Used as the manager's map key, for preference ordering and in logs.
    fn source(&self) -> DataSource;

    /// Fetch one indicator for one country.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(series))` with a non-empty, date-sorted series
    /// - `Ok(None)` when the source has nothing usable (unknown code, country
    ///   not covered, upstream unavailable)
    /// - `Err(_)` only for failures the adapter could not absorb
    async fn get_indicator(
        &self,
        query: &IndicatorQuery,
    ) -> Result<Option<IndicatorSeries>, ProviderError>;

    /// Canonical indicators this provider maps.
    async fn list_indicators(&self) -> Result<Vec<IndicatorInfo>, ProviderError>;

    /// Countries this provider has data for.
    async fn list_countries(&self) -> Result<Vec<CountryInfo>, ProviderError>;
}
