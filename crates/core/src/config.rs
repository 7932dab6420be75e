use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::checkout::{CheckoutLinkBuilder, DEFAULT_LOCALE};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub partner: PartnerConfig,
    pub checkout: CheckoutConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Candidate locations of the curated catalog; the first existing file wins.
    pub local_plan_paths: Vec<PathBuf>,
    pub partner_feed_path: PathBuf,
    pub cache_ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PartnerConfig {
    pub enabled: bool,
    pub api_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub partner_id: Option<String>,
    pub metadata_path: PathBuf,
    pub timeout_secs: u64,
    pub max_age_days: u64,
}

#[derive(Clone, Debug)]
pub struct CheckoutConfig {
    pub base_url: String,
    pub affiliate_base_url: Option<String>,
    pub default_locale: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub local_plan_paths: Option<Vec<PathBuf>>,
    pub partner_feed_path: Option<PathBuf>,
    pub partner_enabled: Option<bool>,
    pub partner_api_key: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["esim.toml", "config/esim.toml"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                local_plan_paths: vec![
                    PathBuf::from("public/plans.json"),
                    PathBuf::from("dist/client/plans.json"),
                    PathBuf::from("plans.json"),
                ],
                partner_feed_path: PathBuf::from("partner_plans.json"),
                cache_ttl_secs: 300,
            },
            partner: PartnerConfig {
                enabled: false,
                api_url: None,
                api_key: None,
                partner_id: None,
                metadata_path: PathBuf::from("partner_metadata.json"),
                timeout_secs: 30,
                max_age_days: 7,
            },
            checkout: CheckoutConfig {
                base_url: "https://saily.com".to_string(),
                affiliate_base_url: None,
                default_locale: DEFAULT_LOCALE.to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl CatalogConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl PartnerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days * 24 * 60 * 60)
    }
}

impl CheckoutConfig {
    pub fn link_builder(&self) -> Result<CheckoutLinkBuilder, ConfigError> {
        let base = parse_http_url("checkout.base_url", &self.base_url)?;
        let affiliate = self
            .affiliate_base_url
            .as_deref()
            .map(|raw| parse_http_url("checkout.affiliate_base_url", raw))
            .transpose()?;
        Ok(CheckoutLinkBuilder::new(base, affiliate))
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(local_plan_paths) = catalog.local_plan_paths {
                self.catalog.local_plan_paths = local_plan_paths;
            }
            if let Some(partner_feed_path) = catalog.partner_feed_path {
                self.catalog.partner_feed_path = partner_feed_path;
            }
            if let Some(cache_ttl_secs) = catalog.cache_ttl_secs {
                self.catalog.cache_ttl_secs = cache_ttl_secs;
            }
        }

        if let Some(partner) = patch.partner {
            if let Some(enabled) = partner.enabled {
                self.partner.enabled = enabled;
            }
            if let Some(api_url) = partner.api_url {
                self.partner.api_url = Some(api_url);
            }
            if let Some(partner_api_key_value) = partner.api_key {
                self.partner.api_key = Some(secret_value(partner_api_key_value));
            }
            if let Some(partner_id) = partner.partner_id {
                self.partner.partner_id = Some(partner_id);
            }
            if let Some(metadata_path) = partner.metadata_path {
                self.partner.metadata_path = metadata_path;
            }
            if let Some(timeout_secs) = partner.timeout_secs {
                self.partner.timeout_secs = timeout_secs;
            }
            if let Some(max_age_days) = partner.max_age_days {
                self.partner.max_age_days = max_age_days;
            }
        }

        if let Some(checkout) = patch.checkout {
            if let Some(base_url) = checkout.base_url {
                self.checkout.base_url = base_url;
            }
            if let Some(affiliate_base_url) = checkout.affiliate_base_url {
                self.checkout.affiliate_base_url = Some(affiliate_base_url);
            }
            if let Some(default_locale) = checkout.default_locale {
                self.checkout.default_locale = default_locale;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ESIM_CATALOG_LOCAL_PLAN_PATHS") {
            self.catalog.local_plan_paths = split_paths(&value);
        }
        if let Some(value) = read_env("ESIM_CATALOG_PARTNER_FEED_PATH") {
            self.catalog.partner_feed_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("ESIM_CATALOG_CACHE_TTL_SECS") {
            self.catalog.cache_ttl_secs = parse_u64("ESIM_CATALOG_CACHE_TTL_SECS", &value)?;
        }

        if let Some(value) = read_env("ESIM_PARTNER_ENABLED") {
            self.partner.enabled = parse_bool("ESIM_PARTNER_ENABLED", &value)?;
        }
        if let Some(value) = read_env("ESIM_PARTNER_API_URL") {
            self.partner.api_url = Some(value);
        }
        if let Some(value) = read_env("ESIM_PARTNER_API_KEY") {
            self.partner.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("ESIM_PARTNER_ID") {
            self.partner.partner_id = Some(value);
        }
        if let Some(value) = read_env("ESIM_PARTNER_METADATA_PATH") {
            self.partner.metadata_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("ESIM_PARTNER_TIMEOUT_SECS") {
            self.partner.timeout_secs = parse_u64("ESIM_PARTNER_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ESIM_PARTNER_MAX_AGE_DAYS") {
            self.partner.max_age_days = parse_u64("ESIM_PARTNER_MAX_AGE_DAYS", &value)?;
        }

        if let Some(value) = read_env("ESIM_CHECKOUT_BASE_URL") {
            self.checkout.base_url = value;
        }
        if let Some(value) = read_env("ESIM_CHECKOUT_AFFILIATE_BASE_URL") {
            self.checkout.affiliate_base_url = Some(value);
        }
        if let Some(value) = read_env("ESIM_CHECKOUT_DEFAULT_LOCALE") {
            self.checkout.default_locale = value;
        }

        if let Some(value) = read_env("ESIM_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ESIM_SERVER_PORT") {
            self.server.port = parse_u16("ESIM_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("ESIM_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("ESIM_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("ESIM_LOGGING_LEVEL").or_else(|| read_env("ESIM_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("ESIM_LOGGING_FORMAT").or_else(|| read_env("ESIM_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(local_plan_paths) = overrides.local_plan_paths {
            self.catalog.local_plan_paths = local_plan_paths;
        }
        if let Some(partner_feed_path) = overrides.partner_feed_path {
            self.catalog.partner_feed_path = partner_feed_path;
        }
        if let Some(enabled) = overrides.partner_enabled {
            self.partner.enabled = enabled;
        }
        if let Some(partner_api_key) = overrides.partner_api_key {
            self.partner.api_key = Some(secret_value(partner_api_key));
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_partner(&self.partner)?;
        validate_checkout(&self.checkout)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.local_plan_paths.is_empty() {
        return Err(ConfigError::Validation(
            "catalog.local_plan_paths must list at least one candidate path".to_string(),
        ));
    }

    if catalog.cache_ttl_secs > 86_400 {
        return Err(ConfigError::Validation(
            "catalog.cache_ttl_secs must be in range 0..=86400".to_string(),
        ));
    }

    Ok(())
}

fn validate_partner(partner: &PartnerConfig) -> Result<(), ConfigError> {
    if partner.timeout_secs == 0 || partner.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "partner.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if partner.max_age_days == 0 {
        return Err(ConfigError::Validation(
            "partner.max_age_days must be greater than zero".to_string(),
        ));
    }

    if let Some(api_url) = &partner.api_url {
        parse_http_url("partner.api_url", api_url)?;
    }

    if partner.enabled {
        if partner.api_url.is_none() {
            return Err(ConfigError::Validation(
                "partner.api_url is required when partner.enabled is true".to_string(),
            ));
        }

        let missing_key = partner
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing_key {
            return Err(ConfigError::Validation(
                "partner.api_key is required when partner.enabled is true (set ESIM_PARTNER_API_KEY)"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_checkout(checkout: &CheckoutConfig) -> Result<(), ConfigError> {
    checkout.link_builder()?;

    if checkout.default_locale.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkout.default_locale must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn parse_http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|error| ConfigError::Validation(format!("{key} is not a valid URL: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!("{key} must start with http:// or https://")));
    }
    Ok(url)
}

fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    partner: Option<PartnerPatch>,
    checkout: Option<CheckoutPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    local_plan_paths: Option<Vec<PathBuf>>,
    partner_feed_path: Option<PathBuf>,
    cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PartnerPatch {
    enabled: Option<bool>,
    api_url: Option<String>,
    api_key: Option<String>,
    partner_id: Option<String>,
    metadata_path: Option<PathBuf>,
    timeout_secs: Option<u64>,
    max_age_days: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckoutPatch {
    base_url: Option<String>,
    affiliate_base_url: Option<String>,
    default_locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
