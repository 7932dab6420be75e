use esim_catalog_core::config::{AppConfig, LoadOptions};
use esim_catalog_sources::{FeedRefresher, RefreshError, RefreshOutcome, RefreshSettings};
use serde_json::json;

use crate::commands::{
    command_runtime, to_data, CommandResult, EXIT_CONFIG_INVALID, EXIT_REFRESH_FAILED,
};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "refresh",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG_INVALID,
            )
        }
    };

    let refresher = match RefreshSettings::from_config(&config).and_then(FeedRefresher::new) {
        Ok(refresher) => refresher,
        Err(error) => return refresh_failure(&error),
    };
    let runtime = match command_runtime("refresh") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    match runtime.block_on(refresher.refresh()) {
        Ok(RefreshOutcome::Updated { plans, metadata }) => CommandResult::success_with_data(
            "refresh",
            format!("partner feed refreshed with {plans} plans"),
            Some(json!({
                "plans": plans,
                "feedPath": refresher.settings().feed_path.display().to_string(),
                "metadata": to_data(&metadata),
            })),
        ),
        Ok(RefreshOutcome::AlreadyRunning) => CommandResult::failure(
            "refresh",
            "refresh_in_progress",
            "a partner feed refresh is already running",
            EXIT_REFRESH_FAILED,
        ),
        Err(error) => refresh_failure(&error),
    }
}

fn refresh_failure(error: &RefreshError) -> CommandResult {
    let error_class = match error {
        RefreshError::Disabled => "refresh_disabled",
        RefreshError::NotConfigured(_) => "refresh_not_configured",
        RefreshError::Source(_) => "refresh_failed",
    };
    CommandResult::failure("refresh", error_class, error.to_string(), EXIT_REFRESH_FAILED)
}
