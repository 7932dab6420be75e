//! JSON API over the plan catalog.
//!
//! - `GET  /api/plans`                               all plans
//! - `GET  /api/plans/stats`                         catalog statistics
//! - `GET  /api/plans/country/{code}`                plans covering a country
//! - `GET  /api/plans/country/{code}/offers`         cheapest plan per data and validity
//! - `GET  /api/plans/country/{code}/lowest-price`   cheapest plan for a country
//! - `GET  /api/plans/region/{region}`               plans for a region page
//! - `GET  /api/checkout/{plan_id}?lang=xx`          checkout redirect target
//! - `POST /api/plans/cache/invalidate`              drop the cached aggregate

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use esim_catalog_core::catalog::{LowestPrice, PlanCatalog, PlanSource, PlanStatistics};
use esim_catalog_core::checkout::{CheckoutLinkBuilder, CheckoutRedirect, DEFAULT_LOCALE};
use esim_catalog_core::domain::plan::{CountryCode, Plan, PlanCollection, PlanId};
use esim_catalog_core::errors::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

pub struct ApiState<L, P> {
    catalog: Arc<PlanCatalog<L, P>>,
    link_builder: Arc<CheckoutLinkBuilder>,
    default_locale: String,
}

impl<L, P> Clone for ApiState<L, P> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            link_builder: Arc::clone(&self.link_builder),
            default_locale: self.default_locale.clone(),
        }
    }
}

impl<L, P> ApiState<L, P> {
    pub fn new(
        catalog: Arc<PlanCatalog<L, P>>,
        link_builder: Arc<CheckoutLinkBuilder>,
        default_locale: String,
    ) -> Self {
        Self { catalog, link_builder, default_locale }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CheckoutQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestPriceResponse {
    pub lowest_price: Option<LowestPrice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,
}

/// Interface error plus the page a shopper should be sent back to.
#[derive(Debug)]
pub struct ApiError {
    error: InterfaceError,
    return_path: Option<String>,
}

impl ApiError {
    fn new(error: ApplicationError) -> Self {
        let error = error.into_interface(Uuid::new_v4().to_string());
        warn!(
            event_name = "server.request.failed",
            correlation_id = error.correlation_id(),
            error = %error,
            "request failed"
        );
        Self { error, return_path: None }
    }

    fn with_return_path(mut self, return_path: String) -> Self {
        self.return_path = Some(return_path);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.error {
            InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            InterfaceError::Unprocessable { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable")
            }
        };

        let body = ErrorBody {
            error: kind,
            message: self.error.user_message().to_string(),
            correlation_id: self.error.correlation_id().to_string(),
            return_path: self.return_path,
        };
        (status, Json(body)).into_response()
    }
}

pub fn router<L, P>(state: ApiState<L, P>) -> Router
where
    L: PlanSource + 'static,
    P: PlanSource + 'static,
{
    Router::new()
        .route("/api/plans", get(list_plans::<L, P>))
        .route("/api/plans/stats", get(plan_statistics::<L, P>))
        .route("/api/plans/country/{code}", get(plans_for_country::<L, P>))
        .route("/api/plans/country/{code}/offers", get(country_offers::<L, P>))
        .route("/api/plans/country/{code}/lowest-price", get(lowest_price::<L, P>))
        .route("/api/plans/region/{region}", get(plans_for_region::<L, P>))
        .route("/api/plans/cache/invalidate", post(invalidate_cache::<L, P>))
        .route("/api/checkout/{plan_id}", get(checkout_redirect::<L, P>))
        .with_state(state)
}

async fn list_plans<L, P>(State(state): State<ApiState<L, P>>) -> Json<PlanCollection>
where
    L: PlanSource,
    P: PlanSource,
{
    let plans = state.catalog.normalized_plans().await;
    Json(PlanCollection { items: plans.items.clone() })
}

async fn plan_statistics<L, P>(State(state): State<ApiState<L, P>>) -> Json<PlanStatistics>
where
    L: PlanSource,
    P: PlanSource,
{
    Json(state.catalog.statistics().await)
}

async fn plans_for_country<L, P>(
    State(state): State<ApiState<L, P>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Plan>>, ApiError>
where
    L: PlanSource,
    P: PlanSource,
{
    let country = country_path(&code)?;
    Ok(Json(state.catalog.plans_for_country(country.as_str()).await))
}

async fn country_offers<L, P>(
    State(state): State<ApiState<L, P>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Plan>>, ApiError>
where
    L: PlanSource,
    P: PlanSource,
{
    let country = country_path(&code)?;
    Ok(Json(state.catalog.country_offers(country.as_str()).await))
}

async fn lowest_price<L, P>(
    State(state): State<ApiState<L, P>>,
    Path(code): Path<String>,
) -> Result<Json<LowestPriceResponse>, ApiError>
where
    L: PlanSource,
    P: PlanSource,
{
    let country = country_path(&code)?;
    let lowest_price = state.catalog.lowest_price_for_country(country.as_str()).await;
    Ok(Json(LowestPriceResponse { lowest_price }))
}

fn country_path(code: &str) -> Result<CountryCode, ApiError> {
    CountryCode::parse(code).map_err(|error| ApiError::new(error.into()))
}

async fn plans_for_region<L, P>(
    State(state): State<ApiState<L, P>>,
    Path(region): Path<String>,
) -> Json<Vec<Plan>>
where
    L: PlanSource,
    P: PlanSource,
{
    Json(state.catalog.plans_for_region(&region).await)
}

async fn invalidate_cache<L, P>(State(state): State<ApiState<L, P>>) -> StatusCode
where
    L: PlanSource,
    P: PlanSource,
{
    state.catalog.invalidate().await;
    StatusCode::NO_CONTENT
}

async fn checkout_redirect<L, P>(
    State(state): State<ApiState<L, P>>,
    Path(plan_id): Path<String>,
    Query(query): Query<CheckoutQuery>,
) -> Result<Json<CheckoutRedirect>, ApiError>
where
    L: PlanSource,
    P: PlanSource,
{
    let locale = request_locale(query.lang.as_deref(), &state.default_locale);

    let Some(plan) = state.catalog.find_plan(&PlanId(plan_id.clone())).await else {
        return Err(ApiError::new(ApplicationError::PlanNotFound(plan_id)));
    };

    match state.link_builder.prepare_checkout(&plan, &locale) {
        Ok(redirect) => {
            info!(
                event_name = "server.checkout.redirect",
                plan_id = %redirect.plan_id,
                locale = %locale,
                "checkout redirect issued"
            );
            Ok(Json(redirect))
        }
        Err(checkout_error) => {
            let return_path = checkout_error.return_path(&locale);
            Err(ApiError::new(checkout_error.into()).with_return_path(return_path))
        }
    }
}

fn request_locale(lang: Option<&str>, default_locale: &str) -> String {
    let requested = lang.map(str::trim).filter(|lang| !lang.is_empty());
    let fallback = if default_locale.trim().is_empty() { DEFAULT_LOCALE } else { default_locale };
    requested.unwrap_or(fallback).to_ascii_lowercase()
}
