use esim_catalog_core::catalog::query::{filter_by_country, filter_by_region};
use esim_catalog_core::config::{AppConfig, LoadOptions};
use esim_catalog_core::domain::plan::Plan;
use esim_catalog_core::taxonomy::{COUNTRIES, REGIONS};
use esim_catalog_sources::file_catalog;
use serde::Serialize;

use crate::commands::{
    command_runtime, to_data, CommandResult, EXIT_CONFIG_INVALID, EXIT_COVERAGE_GAPS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub total_plans: usize,
    pub countries_checked: usize,
    pub countries_with_plans: usize,
    pub missing_countries: Vec<String>,
    pub regions_checked: usize,
    pub missing_regions: Vec<String>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing_countries.is_empty() && self.missing_regions.is_empty()
    }
}

/// Checks every reference country and region against the catalog.
pub fn coverage_report(plans: &[Plan]) -> CoverageReport {
    let missing_countries: Vec<String> = COUNTRIES
        .iter()
        .filter(|country| filter_by_country(plans, country.code).is_empty())
        .map(|country| format!("{} ({})", country.name, country.code))
        .collect();

    let missing_regions: Vec<String> = REGIONS
        .iter()
        .filter(|region| filter_by_region(plans, region.id).is_empty())
        .map(|region| region.id.to_string())
        .collect();

    CoverageReport {
        total_plans: plans.len(),
        countries_checked: COUNTRIES.len(),
        countries_with_plans: COUNTRIES.len() - missing_countries.len(),
        missing_countries,
        regions_checked: REGIONS.len(),
        missing_regions,
    }
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "coverage",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG_INVALID,
            )
        }
    };
    let runtime = match command_runtime("coverage") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let catalog = file_catalog(&config);
    let plans = runtime.block_on(catalog.normalized_plans());
    let report = coverage_report(&plans.items);

    let message = format!(
        "{}/{} countries and {}/{} regions have plans",
        report.countries_with_plans,
        report.countries_checked,
        report.regions_checked - report.missing_regions.len(),
        report.regions_checked
    );

    if report.is_complete() {
        CommandResult::success_with_data("coverage", message, to_data(&report))
    } else {
        CommandResult::failure_with_data(
            "coverage",
            "coverage_gaps",
            message,
            EXIT_COVERAGE_GAPS,
            to_data(&report),
        )
    }
}

#[cfg(test)]
mod tests {
    use esim_catalog_core::catalog::normalizer::PlanNormalizer;
    use esim_catalog_core::taxonomy::COUNTRIES;
    use serde_json::json;

    use super::coverage_report;

    #[test]
    fn empty_catalog_misses_everything() {
        let report = coverage_report(&[]);
        assert!(!report.is_complete());
        assert_eq!(report.missing_countries.len(), COUNTRIES.len());
        assert_eq!(report.missing_regions.len(), 6);
    }

    #[test]
    fn a_global_plan_covers_every_region_but_not_every_country() {
        let countries: Vec<&str> = COUNTRIES.iter().take(60).map(|country| country.code).collect();
        let plan = PlanNormalizer::default()
            .normalize_value(json!({
                "identifier": "global-0001",
                "data_limit": { "amount": 10, "unit": "GB" },
                "duration": { "amount": 30 },
                "price": {
                    "amount_with_tax": 4500,
                    "currency": "USD",
                    "identifier": "price_global"
                },
                "covered_countries": countries,
            }))
            .expect("valid record");

        let report = coverage_report(&[plan]);
        assert!(report.missing_regions.is_empty());
        assert_eq!(report.countries_with_plans, 60);
        assert!(!report.is_complete());
    }
}
