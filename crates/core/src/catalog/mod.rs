pub mod aggregator;
pub mod cache;
pub mod classify;
pub mod local;
pub mod normalizer;
pub mod pricing;
pub mod query;
pub mod source;

use std::sync::Arc;

use crate::domain::plan::{Plan, PlanCollection, PlanId};

pub use aggregator::{AggregationReport, PlanAggregator, SourceStatus};
pub use cache::{PlanCache, DEFAULT_CACHE_TTL};
pub use classify::ClassificationThresholds;
pub use normalizer::{PlanNormalizer, SkippedRecord};
pub use pricing::{format_minor_units, lowest_price_for_country, LowestPrice};
pub use query::{
    compute_statistics, dedupe_cheapest, filter_by_country, filter_by_region, PlanStatistics,
};
pub use source::{PlanSource, SourceError, SourceRole};

/// Read-only query surface over an aggregator instance. Every entry point
/// works on the cached aggregate and never fails.
pub struct PlanCatalog<L, P> {
    aggregator: PlanAggregator<L, P>,
}

impl<L, P> PlanCatalog<L, P>
where
    L: PlanSource,
    P: PlanSource,
{
    pub fn new(aggregator: PlanAggregator<L, P>) -> Self {
        Self { aggregator }
    }

    pub fn from_sources(local: L, partner: P, cache: PlanCache) -> Self {
        Self::new(PlanAggregator::new(local, partner, cache))
    }

    pub fn aggregator(&self) -> &PlanAggregator<L, P> {
        &self.aggregator
    }

    pub async fn normalized_plans(&self) -> Arc<PlanCollection> {
        self.aggregator.normalized_plans().await
    }

    pub async fn plans_for_country(&self, code: &str) -> Vec<Plan> {
        let plans = self.normalized_plans().await;
        filter_by_country(&plans.items, code)
    }

    /// Country plans reduced to the cheapest offer per data and validity
    /// combination, for country landing pages.
    pub async fn country_offers(&self, code: &str) -> Vec<Plan> {
        dedupe_cheapest(&self.plans_for_country(code).await)
    }

    pub async fn plans_for_region(&self, region_id_or_name: &str) -> Vec<Plan> {
        let plans = self.normalized_plans().await;
        filter_by_region(&plans.items, region_id_or_name)
    }

    pub async fn statistics(&self) -> PlanStatistics {
        let plans = self.normalized_plans().await;
        compute_statistics(&plans.items)
    }

    pub async fn find_plan(&self, id: &PlanId) -> Option<Plan> {
        let plans = self.normalized_plans().await;
        plans.items.iter().find(|plan| &plan.id == id).cloned()
    }

    pub async fn lowest_price_for_country(&self, code: &str) -> Option<LowestPrice> {
        let plans = self.normalized_plans().await;
        lowest_price_for_country(&plans.items, code)
    }

    pub async fn invalidate(&self) {
        self.aggregator.invalidate().await;
    }

    pub async fn last_report(&self) -> Option<AggregationReport> {
        self.aggregator.last_report().await
    }
}
