use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::catalog::cache::PlanCache;
use crate::catalog::classify::ClassificationThresholds;
use crate::catalog::local::tag_local_plans;
use crate::catalog::normalizer::{PlanNormalizer, SkippedRecord};
use crate::catalog::source::{PlanSource, SourceError, SourceRole};
use crate::domain::plan::{Plan, PlanCollection};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Available { records: usize },
    Unavailable { reason: String },
}

impl SourceStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// What the last uncached aggregation pass saw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub local: SourceStatus,
    pub partner: SourceStatus,
    pub local_plans: usize,
    pub partner_plans: usize,
    pub skipped: Vec<SkippedRecord>,
    pub aggregated_at: DateTime<Utc>,
}

impl AggregationReport {
    pub fn total_plans(&self) -> usize {
        self.local_plans + self.partner_plans
    }
}

/// Merges the curated catalog with the partner feed and keeps the result for
/// the cache window. Never fails: unavailable sources degrade the result.
pub struct PlanAggregator<L, P> {
    local: L,
    partner: P,
    thresholds: ClassificationThresholds,
    normalizer: PlanNormalizer,
    cache: PlanCache,
    last_report: RwLock<Option<AggregationReport>>,
}

impl<L, P> PlanAggregator<L, P>
where
    L: PlanSource,
    P: PlanSource,
{
    pub fn new(local: L, partner: P, cache: PlanCache) -> Self {
        Self::with_thresholds(local, partner, cache, ClassificationThresholds::default())
    }

    pub fn with_thresholds(
        local: L,
        partner: P,
        cache: PlanCache,
        thresholds: ClassificationThresholds,
    ) -> Self {
        Self {
            local,
            partner,
            thresholds,
            normalizer: PlanNormalizer::new(thresholds),
            cache,
            last_report: RwLock::new(None),
        }
    }

    pub fn thresholds(&self) -> ClassificationThresholds {
        self.thresholds
    }

    pub async fn normalized_plans(&self) -> Arc<PlanCollection> {
        if let Some(cached) = self.cache.get().await {
            debug!(event_name = "catalog.cache.hit", plans = cached.len(), "serving cached plans");
            return cached;
        }

        let (collection, report) = self.aggregate().await;
        let collection = Arc::new(collection);
        self.cache.store(Arc::clone(&collection)).await;
        *self.last_report.write().await = Some(report);

        collection
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
        info!(event_name = "catalog.cache.invalidated", "plan cache invalidated");
    }

    pub async fn last_report(&self) -> Option<AggregationReport> {
        self.last_report.read().await.clone()
    }

    /// One uncached pass over both sources.
    pub async fn aggregate(&self) -> (PlanCollection, AggregationReport) {
        let (local_items, partner_items) =
            tokio::join!(self.local.fetch_items(), self.partner.fetch_items());

        let mut plans: Vec<Plan> = Vec::new();
        let mut skipped: Vec<SkippedRecord> = Vec::new();

        let local = match local_items {
            Ok(items) => {
                let records = items.len();
                let tagged = tag_local_plans(items, &self.thresholds);
                plans.extend(tagged.plans);
                skipped.extend(tagged.skipped);
                SourceStatus::Available { records }
            }
            Err(source_error) => {
                unavailable(SourceRole::Local, &self.local.describe(), source_error)
            }
        };
        let local_plans = plans.len();

        let partner = match partner_items {
            Ok(items) => {
                let records = items.len();
                let report = self.normalizer.normalize_batch(items);
                plans.extend(report.plans);
                skipped.extend(report.skipped);
                SourceStatus::Available { records }
            }
            Err(source_error) => {
                unavailable(SourceRole::Partner, &self.partner.describe(), source_error)
            }
        };
        let partner_plans = plans.len() - local_plans;

        sort_plans(&mut plans);

        if !local.is_available() && !partner.is_available() {
            error!(
                event_name = "catalog.aggregate.empty",
                "both plan sources are unavailable; serving an empty catalog"
            );
        }

        let report = AggregationReport {
            local,
            partner,
            local_plans,
            partner_plans,
            skipped,
            aggregated_at: Utc::now(),
        };

        info!(
            event_name = "catalog.aggregate.completed",
            total = report.total_plans(),
            local_plans,
            partner_plans,
            skipped = report.skipped.len(),
            cache_ttl_secs = self.cache.ttl().as_secs(),
            "plan catalog aggregated"
        );

        (PlanCollection { items: plans }, report)
    }
}

fn unavailable(role: SourceRole, description: &str, source_error: SourceError) -> SourceStatus {
    match role {
        SourceRole::Partner => warn!(
            event_name = "catalog.source.unavailable",
            source_role = role.as_str(),
            source = description,
            error = %source_error,
            "partner feed unavailable; continuing with local plans"
        ),
        SourceRole::Local => error!(
            event_name = "catalog.source.unavailable",
            source_role = role.as_str(),
            source = description,
            error = %source_error,
            "local plan catalog unavailable"
        ),
    }

    SourceStatus::Unavailable { reason: source_error.to_string() }
}

/// Single-country plans first, then ascending price. Stable, so equal keys keep
/// their input order.
pub fn sort_plans(plans: &mut [Plan]) {
    plans.sort_by_key(|plan| (!plan.is_single_country(), plan.price.amount_with_tax));
}
