use esim_catalog_core::config::{AppConfig, LoadOptions};
use esim_catalog_sources::file_catalog;
use serde_json::json;

use crate::commands::{command_runtime, to_data, CommandResult, EXIT_CONFIG_INVALID};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG_INVALID,
            )
        }
    };
    let runtime = match command_runtime("stats") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let catalog = file_catalog(&config);
    let (statistics, report) =
        runtime.block_on(async { (catalog.statistics().await, catalog.last_report().await) });

    let message = format!(
        "{} plans ({} local, {} third-party) covering {} countries",
        statistics.total_plans,
        statistics.local_plans,
        statistics.third_party_plans,
        statistics.countries_covered
    );
    let data = json!({
        "statistics": to_data(&statistics),
        "aggregation": report.as_ref().and_then(to_data),
    });

    CommandResult::success_with_data("stats", message, Some(data))
}
