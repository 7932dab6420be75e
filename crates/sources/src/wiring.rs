use esim_catalog_core::catalog::{ClassificationThresholds, PlanAggregator, PlanCache, PlanCatalog};
use esim_catalog_core::config::AppConfig;

use crate::file::JsonFileSource;

/// Catalog over the curated plan file and the stored partner feed.
pub type FileCatalog = PlanCatalog<JsonFileSource, JsonFileSource>;

pub fn local_source(config: &AppConfig) -> JsonFileSource {
    JsonFileSource::new(config.catalog.local_plan_paths.iter().cloned())
}

pub fn partner_source(config: &AppConfig) -> JsonFileSource {
    JsonFileSource::single(config.catalog.partner_feed_path.clone())
}

pub fn file_catalog(config: &AppConfig) -> FileCatalog {
    PlanCatalog::new(PlanAggregator::with_thresholds(
        local_source(config),
        partner_source(config),
        PlanCache::new(config.catalog.cache_ttl()),
        ClassificationThresholds::default(),
    ))
}
