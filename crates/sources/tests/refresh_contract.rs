use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use esim_catalog_core::catalog::source::{PlanSource, SourceError};
use esim_catalog_sources::metadata::FeedStatus;
use esim_catalog_sources::{
    read_metadata, FeedRefresher, JsonFileSource, RefreshError, RefreshOutcome, RefreshSettings,
};
use serde_json::{json, Value};
use tempfile::TempDir;

const API_KEY: &str = "pk-contract-test";

async fn plans(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers.get("x-api-key").and_then(|value| value.to_str().ok()) == Some(API_KEY)
        && headers.get("x-partner-id").and_then(|value| value.to_str().ok()) == Some("travel-esim");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "items": [
                {
                    "identifier": "0e6b9a52-7c1f-4e0e-9a55-55aa66bb77cc",
                    "data_limit": { "amount": 5, "unit": "GB" },
                    "duration": { "amount": 30 },
                    "price": {
                        "amount_with_tax": 1200,
                        "currency": "USD",
                        "identifier": "price_na_5gb"
                    },
                    "covered_countries": ["US", "CA", "MX"]
                },
                {
                    "identifier": "9d1f0b7e-2a44-4c3b-8f61-0123456789ab",
                    "data_limit": { "amount": 1, "unit": "GB" },
                    "duration": { "amount": 7 },
                    "price": {
                        "amount_with_tax": 450,
                        "currency": "USD",
                        "identifier": "price_jp_1gb"
                    },
                    "covered_countries": ["JP"]
                }
            ]
        })),
    )
}

async fn slow_plans(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    tokio::time::sleep(Duration::from_millis(200)).await;
    plans(headers).await
}

async fn spawn_partner_api() -> SocketAddr {
    let app = Router::new()
        .route("/v2/partners/plans", get(plans))
        .route("/slow", get(slow_plans))
        .route("/unavailable", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/no-items", get(|| async { Json(json!({ "plans": [] })) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn settings(addr: SocketAddr, route: &str, dir: &Path) -> RefreshSettings {
    RefreshSettings {
        api_url: format!("http://{addr}{route}"),
        api_key: API_KEY.to_string().into(),
        partner_id: Some("travel-esim".to_string()),
        feed_path: dir.join("partner_plans.json"),
        metadata_path: dir.join("partner_metadata.json"),
        timeout: Duration::from_secs(5),
        max_age: Duration::from_secs(7 * 24 * 60 * 60),
    }
}

#[tokio::test]
async fn refresh_writes_feed_and_metadata() {
    let addr = spawn_partner_api().await;
    let dir = TempDir::new().expect("temp dir");
    let settings = settings(addr, "/v2/partners/plans", dir.path());
    let refresher = FeedRefresher::new(settings.clone()).expect("refresher");

    assert!(refresher.needs_refresh(chrono::Utc::now()).await);

    let outcome = refresher.refresh().await.expect("refresh succeeds");
    let RefreshOutcome::Updated { plans, metadata } = outcome else {
        panic!("expected an update");
    };
    assert_eq!(plans, 2);
    assert_eq!(metadata.update_count, 1);
    assert_eq!(metadata.status, FeedStatus::Success);
    assert!(metadata.next_update > metadata.last_updated);

    let items = JsonFileSource::single(&settings.feed_path).fetch_items().await.expect("feed");
    assert_eq!(items.len(), 2);
    assert!(!refresher.needs_refresh(chrono::Utc::now()).await);

    refresher.refresh().await.expect("second refresh");
    let stored = read_metadata(&settings.metadata_path).await.expect("metadata");
    assert_eq!(stored.update_count, 2);
    assert!(!refresher.is_running());
}

#[tokio::test]
async fn upstream_failure_is_recorded_and_keeps_existing_feed() {
    let addr = spawn_partner_api().await;
    let dir = TempDir::new().expect("temp dir");
    let settings = settings(addr, "/unavailable", dir.path());
    std::fs::write(&settings.feed_path, r#"{"items":[{"identifier":"kept"}]}"#).expect("seed feed");

    let refresher = FeedRefresher::new(settings.clone()).expect("refresher");
    let error = refresher.refresh().await.expect_err("upstream is down");
    assert!(matches!(error, RefreshError::Source(SourceError::Http(_))));

    let stored = read_metadata(&settings.metadata_path).await.expect("metadata");
    assert_eq!(stored.status, FeedStatus::Error);
    assert!(stored.last_error.as_deref().is_some_and(|message| message.contains("503")));

    let items = JsonFileSource::single(&settings.feed_path).fetch_items().await.expect("feed");
    assert_eq!(items, vec![json!({ "identifier": "kept" })]);
    assert!(refresher.needs_refresh(chrono::Utc::now()).await);
}

#[tokio::test]
async fn document_without_items_is_rejected() {
    let addr = spawn_partner_api().await;
    let dir = TempDir::new().expect("temp dir");
    let settings = settings(addr, "/no-items", dir.path());

    let refresher = FeedRefresher::new(settings.clone()).expect("refresher");
    let error = refresher.refresh().await.expect_err("no items array");
    assert!(matches!(error, RefreshError::Source(SourceError::Parse { .. })));
    assert!(!settings.feed_path.exists());
}

#[tokio::test]
async fn wrong_credentials_fail_the_refresh() {
    let addr = spawn_partner_api().await;
    let dir = TempDir::new().expect("temp dir");
    let mut settings = settings(addr, "/v2/partners/plans", dir.path());
    settings.api_key = "pk-wrong".to_string().into();

    let refresher = FeedRefresher::new(settings).expect("refresher");
    let error = refresher.refresh().await.expect_err("unauthorized");
    assert!(error.to_string().contains("401"));
}

#[tokio::test]
async fn overlapping_refreshes_are_refused() {
    let addr = spawn_partner_api().await;
    let dir = TempDir::new().expect("temp dir");
    let refresher = FeedRefresher::new(settings(addr, "/slow", dir.path())).expect("refresher");

    let (first, second) = tokio::join!(refresher.refresh(), refresher.refresh());
    assert!(matches!(first, Ok(RefreshOutcome::Updated { plans: 2, .. })));
    assert!(matches!(second, Ok(RefreshOutcome::AlreadyRunning)));
}
