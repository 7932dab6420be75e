use std::sync::Arc;

use esim_catalog_core::checkout::CheckoutLinkBuilder;
use esim_catalog_core::config::{AppConfig, ConfigError};
use esim_catalog_sources::{file_catalog, FeedRefresher, FileCatalog, RefreshError, RefreshSettings};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<FileCatalog>,
    pub link_builder: Arc<CheckoutLinkBuilder>,
    pub refresher: Option<Arc<FeedRefresher>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("partner feed refresher could not start: {0}")]
    Refresher(#[from] RefreshError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "server.bootstrap.start", "starting application bootstrap");

    let link_builder = Arc::new(config.checkout.link_builder()?);
    let catalog = Arc::new(file_catalog(&config));

    let refresher = if config.partner.enabled {
        let refresher = FeedRefresher::new(RefreshSettings::from_config(&config)?)?;
        Some(Arc::new(refresher))
    } else {
        None
    };

    info!(
        event_name = "server.bootstrap.ready",
        local_plan_paths = config.catalog.local_plan_paths.len(),
        partner_feed = %config.catalog.partner_feed_path.display(),
        cache_ttl_secs = config.catalog.cache_ttl_secs,
        partner_refresh = refresher.is_some(),
        "plan catalog wired"
    );

    Ok(Application { config, catalog, link_builder, refresher })
}

#[cfg(test)]
mod tests {
    use esim_catalog_core::config::AppConfig;
    use secrecy::SecretString;

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    #[test]
    fn default_config_bootstraps_without_refresher() {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap");
        assert!(app.refresher.is_none());
    }

    #[test]
    fn enabled_partner_feed_gets_a_refresher() {
        let mut config = AppConfig::default();
        config.partner.enabled = true;
        config.partner.api_url = Some("https://partner.example.com/v2/partners/plans".to_string());
        config.partner.api_key = Some(SecretString::from("0123456789abcdef".to_string()));

        let app = bootstrap_with_config(config).expect("bootstrap");
        assert!(app.refresher.is_some());
    }

    #[test]
    fn enabled_partner_feed_without_key_fails_fast() {
        let mut config = AppConfig::default();
        config.partner.enabled = true;
        config.partner.api_url = Some("https://partner.example.com/v2/partners/plans".to_string());

        let result = bootstrap_with_config(config);
        assert!(matches!(result, Err(BootstrapError::Refresher(_))));
    }

    #[test]
    fn invalid_checkout_url_is_a_config_error() {
        let mut config = AppConfig::default();
        config.checkout.base_url = "ftp://checkout.example.com".to_string();

        let result = bootstrap_with_config(config);
        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }
}
