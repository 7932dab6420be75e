use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use esim_catalog_core::catalog::{PlanCatalog, PlanSource, SourceStatus};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub plans: usize,
    pub local: Option<SourceStatus>,
    pub partner: Option<SourceStatus>,
    pub checked_at: String,
}

pub fn router<L, P>(catalog: Arc<PlanCatalog<L, P>>) -> Router
where
    L: PlanSource + 'static,
    P: PlanSource + 'static,
{
    Router::new().route("/health", get(health::<L, P>)).with_state(catalog)
}

/// Ready while the catalog serves at least one plan.
pub async fn health<L, P>(
    State(catalog): State<Arc<PlanCatalog<L, P>>>,
) -> (StatusCode, Json<HealthResponse>)
where
    L: PlanSource,
    P: PlanSource,
{
    let plans = catalog.normalized_plans().await.len();
    let report = catalog.last_report().await;
    let ready = plans > 0;

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        plans,
        local: report.as_ref().map(|report| report.local.clone()),
        partner: report.map(|report| report.partner),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
