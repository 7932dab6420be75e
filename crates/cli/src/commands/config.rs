use std::env;
use std::fs;
use std::path::Path;

use esim_catalog_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let local_plan_paths = config
        .catalog
        .local_plan_paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let api_key = config
        .partner
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let fields: Vec<(&str, String, &str)> = vec![
        ("catalog.local_plan_paths", local_plan_paths, "ESIM_CATALOG_LOCAL_PLAN_PATHS"),
        (
            "catalog.partner_feed_path",
            config.catalog.partner_feed_path.display().to_string(),
            "ESIM_CATALOG_PARTNER_FEED_PATH",
        ),
        (
            "catalog.cache_ttl_secs",
            config.catalog.cache_ttl_secs.to_string(),
            "ESIM_CATALOG_CACHE_TTL_SECS",
        ),
        ("partner.enabled", config.partner.enabled.to_string(), "ESIM_PARTNER_ENABLED"),
        ("partner.api_url", optional(config.partner.api_url.as_deref()), "ESIM_PARTNER_API_URL"),
        ("partner.api_key", api_key, "ESIM_PARTNER_API_KEY"),
        ("partner.partner_id", optional(config.partner.partner_id.as_deref()), "ESIM_PARTNER_ID"),
        (
            "partner.metadata_path",
            config.partner.metadata_path.display().to_string(),
            "ESIM_PARTNER_METADATA_PATH",
        ),
        (
            "partner.timeout_secs",
            config.partner.timeout_secs.to_string(),
            "ESIM_PARTNER_TIMEOUT_SECS",
        ),
        (
            "partner.max_age_days",
            config.partner.max_age_days.to_string(),
            "ESIM_PARTNER_MAX_AGE_DAYS",
        ),
        ("checkout.base_url", config.checkout.base_url.clone(), "ESIM_CHECKOUT_BASE_URL"),
        (
            "checkout.affiliate_base_url",
            optional(config.checkout.affiliate_base_url.as_deref()),
            "ESIM_CHECKOUT_AFFILIATE_BASE_URL",
        ),
        (
            "checkout.default_locale",
            config.checkout.default_locale.clone(),
            "ESIM_CHECKOUT_DEFAULT_LOCALE",
        ),
        ("server.bind_address", config.server.bind_address.clone(), "ESIM_SERVER_BIND_ADDRESS"),
        ("server.port", config.server.port.to_string(), "ESIM_SERVER_PORT"),
        ("logging.level", config.logging.level.clone(), "ESIM_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "ESIM_LOGGING_FORMAT"),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in fields {
        let source =
            field_source(key, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    lines.join("\n")
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or("<unset>").to_string()
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
