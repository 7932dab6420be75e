use std::sync::Arc;

use chrono::Utc;
use esim_catalog_core::catalog::{PlanCatalog, PlanSource};
use esim_catalog_sources::{until_next_run, FeedRefresher, RefreshOutcome};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Weekly partner feed refresh, run off the request path.
///
/// A stale or missing feed is refreshed once at startup; afterwards the task
/// sleeps until the next Sunday slot.
pub fn spawn<L, P>(refresher: Arc<FeedRefresher>, catalog: Arc<PlanCatalog<L, P>>) -> JoinHandle<()>
where
    L: PlanSource + 'static,
    P: PlanSource + 'static,
{
    tokio::spawn(async move {
        if refresher.needs_refresh(Utc::now()).await {
            info!(event_name = "server.scheduler.startup_refresh", "partner feed is stale");
            run_once(&refresher, &catalog).await;
        }

        loop {
            let wait = until_next_run(Utc::now());
            info!(
                event_name = "server.scheduler.sleeping",
                wait_secs = wait.as_secs(),
                "next partner feed refresh scheduled"
            );
            tokio::time::sleep(wait).await;
            run_once(&refresher, &catalog).await;
        }
    })
}

/// Runs one refresh and drops the cached aggregate when the feed changed.
pub async fn run_once<L, P>(refresher: &FeedRefresher, catalog: &PlanCatalog<L, P>) -> bool
where
    L: PlanSource,
    P: PlanSource,
{
    match refresher.refresh().await {
        Ok(RefreshOutcome::Updated { plans, .. }) => {
            catalog.invalidate().await;
            info!(event_name = "server.scheduler.refreshed", plans, "partner feed swapped in");
            true
        }
        Ok(RefreshOutcome::AlreadyRunning) => false,
        Err(error) => {
            warn!(
                event_name = "server.scheduler.refresh_failed",
                error = %error,
                "scheduled partner feed refresh failed; keeping the previous feed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::net::SocketAddr;

    use axum::{routing::get, Json, Router};
    use esim_catalog_core::config::AppConfig;
    use esim_catalog_sources::{file_catalog, FeedRefresher, RefreshSettings};
    use secrecy::SecretString;
    use serde_json::json;
    use tempfile::TempDir;

    use super::run_once;

    async fn spawn_partner_api() -> SocketAddr {
        let app = Router::new()
            .route(
                "/plans",
                get(|| async {
                    Json(json!({ "items": [{
                        "identifier": "9d1f0b7e-2a44-4c3b-8f61-0123456789ab",
                        "data_limit": { "amount": 1, "unit": "GB" },
                        "duration": { "amount": 7 },
                        "price": {
                            "amount_with_tax": 450,
                            "currency": "USD",
                            "identifier": "price_jp_1gb"
                        },
                        "covered_countries": ["JP"]
                    }] }))
                }),
            )
            .route("/down", get(|| async { axum::http::StatusCode::BAD_GATEWAY }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let address = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        address
    }

    fn config(dir: &TempDir, api_url: String) -> AppConfig {
        fs::write(
            dir.path().join("plans.json"),
            r#"{ "items": [{
                "id": "bg-1gb-7d", "name": "Bulgaria 1GB", "data_amount": 1, "data_unit": "GB",
                "validity_days": 7, "price": { "amount_with_tax": 399, "currency": "USD" },
                "covered_countries": ["BG"]
            }] }"#,
        )
        .expect("write local plans");

        let mut config = AppConfig::default();
        config.catalog.local_plan_paths = vec![dir.path().join("plans.json")];
        config.catalog.partner_feed_path = dir.path().join("partner_plans.json");
        config.partner.metadata_path = dir.path().join("partner_metadata.json");
        config.partner.enabled = true;
        config.partner.api_url = Some(api_url);
        config.partner.api_key = Some(SecretString::from("0123456789abcdef".to_string()));
        config
    }

    #[tokio::test]
    async fn successful_refresh_invalidates_the_catalog() {
        let address = spawn_partner_api().await;
        let dir = TempDir::new().expect("temp dir");
        let config = config(&dir, format!("http://{address}/plans"));
        let catalog = file_catalog(&config);
        let refresher =
            FeedRefresher::new(RefreshSettings::from_config(&config).expect("settings"))
                .expect("refresher");

        assert_eq!(catalog.normalized_plans().await.len(), 1);

        assert!(run_once(&refresher, &catalog).await);
        let plans = catalog.normalized_plans().await;
        assert_eq!(plans.len(), 2);
        assert!(plans.items.iter().any(|plan| plan.id.0 == "partner-jp-1gb-7d-456789ab"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_cached_catalog() {
        let address = spawn_partner_api().await;
        let dir = TempDir::new().expect("temp dir");
        let config = config(&dir, format!("http://{address}/down"));
        let catalog = file_catalog(&config);
        let refresher =
            FeedRefresher::new(RefreshSettings::from_config(&config).expect("settings"))
                .expect("refresher");

        let before = catalog.normalized_plans().await;
        assert!(!run_once(&refresher, &catalog).await);
        let after = catalog.normalized_plans().await;

        assert!(std::sync::Arc::ptr_eq(&before, &after));
        assert!(!dir.path().join("partner_plans.json").exists());
    }
}
