use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{NaiveDate, Utc};
use econdata_core::{CacheManager, IndicatorService};
use econdata_providers::{
    CountryInfo, DataPoint, DataSource, Frequency, IndicatorCategory, IndicatorInfo,
    IndicatorProvider, IndicatorQuery, IndicatorSeries, ProviderError, ProviderManager,
};
use econdata_server::{api::app_router, config::Config, scheduler, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// World Bank stand-in: GDP and INFLATION for USA and GBR, two points of M2 for USA.
struct MockWorldBank {
    call_count: AtomicUsize,
}

#[async_trait]
impl IndicatorProvider for MockWorldBank {
    fn source(&self) -> DataSource {
        DataSource::WorldBank
    }

    async fn get_indicator(
        &self,
        query: &IndicatorQuery,
    ) -> Result<Option<IndicatorSeries>, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let values: &[f64] = match (query.indicator_id.as_str(), query.country_code.as_str()) {
            ("GDP", "USA") => &[2.3, 2.9, -2.2, 6.1, 2.5],
            ("GDP", "GBR") => &[1.7, 1.6, -10.4, 8.7, 4.3],
            ("INFLATION", "USA") => &[2.1, 1.8, 1.2, 4.7, 8.0],
            ("M2", "USA") => &[15.0, 21.0],
            _ => return Ok(None),
        };
        Ok(Some(IndicatorSeries {
            indicator_id: query.indicator_id.clone(),
            name: format!("{} (World Bank)", query.indicator_id),
            category: IndicatorCategory::Gdp,
            description: None,
            unit: None,
            frequency: Frequency::Annual,
            source: DataSource::WorldBank,
            country_code: query.country_code.clone(),
            country_name: query.country_code.clone(),
            data: values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    DataPoint::new(NaiveDate::from_ymd_opt(2018 + i as i32, 1, 1).unwrap(), *v)
                })
                .collect(),
            last_updated: Utc::now(),
            metadata: Default::default(),
        }))
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorInfo>, ProviderError> {
        Ok(vec![
            IndicatorInfo::from_mapping("GDP", "NY.GDP.MKTP.KD.ZG"),
            IndicatorInfo::from_mapping("INFLATION", "FP.CPI.TOTL.ZG"),
        ])
    }

    async fn list_countries(&self) -> Result<Vec<CountryInfo>, ProviderError> {
        Ok(vec![
            CountryInfo {
                region: Some("North America".to_string()),
                ..CountryInfo::new("USA", "United States")
            },
            CountryInfo {
                region: Some("Europe & Central Asia".to_string()),
                ..CountryInfo::new("GBR", "United Kingdom")
            },
        ])
    }
}

/// FRED stand-in that never answers.
struct HangingFred {
    call_count: AtomicUsize,
}

#[async_trait]
impl IndicatorProvider for HangingFred {
    fn source(&self) -> DataSource {
        DataSource::Fred
    }

    async fn get_indicator(
        &self,
        _query: &IndicatorQuery,
    ) -> Result<Option<IndicatorSeries>, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        Ok(None)
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorInfo>, ProviderError> {
        Ok(Vec::new())
    }

    async fn list_countries(&self) -> Result<Vec<CountryInfo>, ProviderError> {
        Ok(Vec::new())
    }
}

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    provider: Arc<MockWorldBank>,
}

fn test_app() -> TestApp {
    let provider = Arc::new(MockWorldBank {
        call_count: AtomicUsize::new(0),
    });
    let manager = ProviderManager::new(vec![provider.clone() as Arc<dyn IndicatorProvider>]);
    let cache = Arc::new(CacheManager::new(Duration::from_secs(3600)));
    let service = IndicatorService::new(Arc::new(manager), cache);
    let state = Arc::new(AppState::new(Arc::new(service), Duration::from_secs(300)));
    let config = Config::from_lookup(|_| None).unwrap();

    TestApp {
        router: app_router(state.clone(), &config),
        state,
        provider,
    }
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn get(router: &Router, uri: &str) -> Response {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(router: &Router, uri: &str, body: Value) -> Response {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn get_indicator_returns_series_and_caches_it() {
    let app = test_app();

    let response = get(&app.router, "/api/v1/indicators/GDP?country=usa").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["source"], "world_bank");
    assert_eq!(body["country_code"], "USA");
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let again = get(&app.router, "/api/v1/indicators/GDP?country=USA").await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(app.provider.call_count.load(Ordering::SeqCst), 1);

    let stats = json_body(get(&app.router, "/api/v1/cache/stats").await).await;
    assert_eq!(stats["active_entries"], 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_domestic_source_falls_back_within_request_timeout() {
    let config = Config::from_lookup(|_| None).unwrap();
    let fred = Arc::new(HangingFred {
        call_count: AtomicUsize::new(0),
    });
    let world_bank = Arc::new(MockWorldBank {
        call_count: AtomicUsize::new(0),
    });
    let manager = ProviderManager::new(vec![
        fred.clone() as Arc<dyn IndicatorProvider>,
        world_bank.clone() as Arc<dyn IndicatorProvider>,
    ])
    .with_source_timeout(config.providers.source_timeout());
    let cache = Arc::new(CacheManager::new(Duration::from_secs(3600)));
    let service = IndicatorService::new(Arc::new(manager), cache);
    let state = Arc::new(AppState::new(Arc::new(service), Duration::from_secs(300)));
    let router = app_router(state, &config);

    let response = get(&router, "/api/v1/indicators/GDP?country=USA").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["source"], "world_bank");
    assert_eq!(fred.call_count.load(Ordering::SeqCst), 1);
    assert_eq!(world_bank.call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_indicator_is_404_with_error_body() {
    let app = test_app();

    let response = get(&app.router, "/api/v1/indicators/HOUSING_STARTS?country=USA").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], 404);
    assert!(body["message"].as_str().unwrap().contains("HOUSING_STARTS"));
}

#[tokio::test]
async fn unknown_source_selector_is_rejected() {
    let app = test_app();

    let response = get(&app.router, "/api/v1/indicators/GDP?country=USA&source=imf").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compare_validates_country_count() {
    let app = test_app();

    let single = post_json(
        &app.router,
        "/api/v1/indicators/compare",
        json!({ "indicator": "GDP", "countries": ["USA"] }),
    )
    .await;
    assert_eq!(single.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(single).await["code"], 400);

    let pair = post_json(
        &app.router,
        "/api/v1/indicators/compare",
        json!({ "indicator": "GDP", "countries": ["USA", "GBR", "FRA"], "source": "all" }),
    )
    .await;
    assert_eq!(pair.status(), StatusCode::OK);
    let body = json_body(pair).await;
    assert_eq!(body["indicator_name"], "GDP (World Bank)");
    assert_eq!(body["countries"].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn calculate_reports_statistics_and_explicit_trend_errors() {
    let app = test_app();

    let response = post_json(
        &app.router,
        "/api/v1/analytics/calculate",
        json!({
            "indicator": "INFLATION",
            "country": "USA",
            "start_date": "2018-01-01",
            "end_date": "2023-01-01",
            "calculations": ["min", "max", "trend"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["statistics"]["max"], 8.0);
    assert_eq!(body["trend"]["direction"], "increasing");

    let short_default = post_json(
        &app.router,
        "/api/v1/analytics/calculate",
        json!({
            "indicator": "M2",
            "country": "USA",
            "start_date": "2018-01-01",
            "end_date": "2023-01-01"
        }),
    )
    .await;
    assert_eq!(short_default.status(), StatusCode::OK);
    let body = json_body(short_default).await;
    assert_eq!(body["statistics"]["mean"], 18.0);
    assert_eq!(body["statistics"].as_object().unwrap().len(), 5);
    assert!(body.get("trend").is_none());

    let short_trend = post_json(
        &app.router,
        "/api/v1/analytics/calculate",
        json!({
            "indicator": "M2",
            "country": "USA",
            "start_date": "2018-01-01",
            "end_date": "2023-01-01",
            "calculations": ["mean", "trend"]
        }),
    )
    .await;
    assert_eq!(short_trend.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn correlation_over_query_string() {
    let app = test_app();

    let response = get(
        &app.router,
        "/api/v1/analytics/correlation?indicator1=GDP&indicator2=INFLATION&country=USA",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data_points"], 5);
    let coefficient = body["correlation"].as_f64().unwrap();
    assert!((-1.0..=1.0).contains(&coefficient));
    assert_eq!(body["indicator1"]["id"], "GDP");

    let missing = get(
        &app.router,
        "/api/v1/analytics/correlation?indicator1=GDP&indicator2=DEBT&country=USA",
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings() {
    let app = test_app();

    let indicators = json_body(get(&app.router, "/api/v1/indicators").await).await;
    assert_eq!(indicators["total"], 2);

    let categories = json_body(get(&app.router, "/api/v1/indicators/categories/list").await).await;
    assert_eq!(categories["total_categories"], 8);

    let regions = json_body(get(&app.router, "/api/v1/countries/regions/list").await).await;
    assert_eq!(regions["total"], 7);

    let countries = json_body(get(&app.router, "/api/v1/countries?region=north%20america").await).await;
    assert_eq!(countries["total_entries"], 1);

    let country = get(&app.router, "/api/v1/countries/gbr").await;
    assert_eq!(country.status(), StatusCode::OK);
    assert_eq!(json_body(country).await["name"], "United Kingdom");

    let sources = json_body(get(&app.router, "/api/v1/sources").await).await;
    assert_eq!(sources, json!(["world_bank"]));
}

#[tokio::test]
async fn summary_uses_latest_points() {
    let app = test_app();

    let response = get(&app.router, "/api/v1/analytics/summary/USA").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["indicators"]["GDP"]["value"], 2.5);
    assert_eq!(body["indicators"]["INFLATION"]["value"], 8.0);
    assert!(body["indicators"].get("UNEMPLOYMENT").is_none());
}

#[tokio::test]
async fn clear_cache_and_sweep() {
    let app = test_app();

    get(&app.router, "/api/v1/indicators/GDP?country=USA").await;
    assert_eq!(app.state.indicator_service.cache_stats().total_entries, 1);
    assert_eq!(scheduler::run_cache_sweep(&app.state), 0);

    let response = send(
        &app.router,
        Request::builder()
            .method("DELETE")
            .uri("/api/v1/cache")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.state.indicator_service.cache_stats().total_entries, 0);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = test_app();

    let response = get(&app.router, "/api/v2/nothing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], 404);
}
