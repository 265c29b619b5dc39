use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use econdata_core::indicators::{
    deserialize_source_selector, AnalyticsReport, CalculationRequest, CategoryListing,
    CompareRequest, Comparison, CorrelationReport, CorrelationRequest, CountryListing,
    EconomicSummary, IndicatorListing, IndicatorRequest, RegionListing,
};
use econdata_core::CacheStats;
use econdata_providers::{CountryInfo, DataSource, IndicatorSeries};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub async fn healthz() -> &'static str {
    "ok"
}

async fn list_indicators(State(state): State<Arc<AppState>>) -> Json<IndicatorListing> {
    Json(state.indicator_service.list_indicators().await)
}

#[derive(Deserialize)]
struct IndicatorParams {
    country: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_source_selector")]
    source: Option<DataSource>,
}

async fn get_indicator(
    Path(indicator): Path<String>,
    Query(params): Query<IndicatorParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<IndicatorSeries>> {
    let request = IndicatorRequest {
        indicator,
        country: params.country,
        start_date: params.start_date,
        end_date: params.end_date,
        source: params.source,
    };
    let series = state.indicator_service.get_indicator(request).await?;
    Ok(Json(series))
}

async fn compare_indicators(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompareRequest>,
) -> ApiResult<Json<Comparison>> {
    let comparison = state.indicator_service.compare(payload).await?;
    Ok(Json(comparison))
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoryListing> {
    Json(state.indicator_service.categories())
}

#[derive(Deserialize)]
struct CountryParams {
    #[serde(default)]
    region: Option<String>,
    #[serde(default, deserialize_with = "deserialize_source_selector")]
    source: Option<DataSource>,
}

async fn list_countries(
    Query(params): Query<CountryParams>,
    State(state): State<Arc<AppState>>,
) -> Json<CountryListing> {
    Json(
        state
            .indicator_service
            .list_countries(params.region.as_deref(), params.source)
            .await,
    )
}

async fn list_regions(State(state): State<Arc<AppState>>) -> Json<RegionListing> {
    Json(state.indicator_service.regions())
}

async fn get_country(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CountryInfo>> {
    let country = state.indicator_service.country_info(&code).await?;
    Ok(Json(country))
}

async fn calculate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CalculationRequest>,
) -> ApiResult<Json<AnalyticsReport>> {
    let report = state.indicator_service.calculate(payload).await?;
    Ok(Json(report))
}

async fn correlation(
    Query(params): Query<CorrelationRequest>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CorrelationReport>> {
    let report = state.indicator_service.correlate(params).await?;
    Ok(Json(report))
}

async fn economic_summary(
    Path(country): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<EconomicSummary>> {
    let summary = state.indicator_service.summary(&country).await?;
    Ok(Json(summary))
}

async fn list_sources(State(state): State<Arc<AppState>>) -> Json<Vec<DataSource>> {
    Json(state.indicator_service.available_sources())
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.indicator_service.cache_stats())
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.indicator_service.clear_cache();
    StatusCode::NO_CONTENT
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/indicators", get(list_indicators))
        .route("/indicators/compare", post(compare_indicators))
        .route("/indicators/categories/list", get(list_categories))
        .route("/indicators/{indicator}", get(get_indicator))
        .route("/countries", get(list_countries))
        .route("/countries/regions/list", get(list_regions))
        .route("/countries/{code}", get(get_country))
        .route("/analytics/calculate", post(calculate))
        .route("/analytics/correlation", get(correlation))
        .route("/analytics/summary/{country}", get(economic_summary))
        .route("/sources", get(list_sources))
        .route("/cache/stats", get(cache_stats))
        .route("/cache", delete(clear_cache))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
