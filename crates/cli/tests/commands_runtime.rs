use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use esim_catalog_cli::commands::{coverage, doctor, refresh, stats};
use esim_catalog_core::config::LoadOptions;
use serde_json::Value;
use tempfile::TempDir;

const LOCAL_PLANS: &str = r#"{ "items": [
    {
        "id": "bg-1gb-7d", "identifier": "price_bg_1", "name": "Bulgaria 1GB",
        "data_amount": 1, "data_unit": "GB", "validity_days": 7,
        "price": { "amount_with_tax": 399, "currency": "USD" },
        "covered_countries": ["BG"]
    },
    {
        "id": "tr-3gb-15d", "identifier": "price_tr_3", "name": "Turkey 3GB",
        "data_amount": 3, "data_unit": "GB", "validity_days": 15,
        "price": { "amount_with_tax": 899, "currency": "USD" },
        "covered_countries": ["TR"]
    }
] }"#;

const PARTNER_FEED: &str = r#"{ "items": [
    {
        "identifier": "0a1b2c3d-4e5f-6a7b-8c9d-0e1f66bb77cc",
        "data_limit": { "amount": 5, "unit": "GB" },
        "duration": { "amount": 30 },
        "price": { "amount_with_tax": 1500, "currency": "USD", "identifier": "price_na_5" },
        "covered_countries": ["US", "CA", "MX"]
    },
    { "identifier": "broken", "price": { "amount_with_tax": 100 } }
] }"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(with_feed: bool) -> Self {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("plans.json"), LOCAL_PLANS).expect("write local plans");
        if with_feed {
            fs::write(dir.path().join("partner_plans.json"), PARTNER_FEED)
                .expect("write partner feed");
        }
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ESIM_CATALOG_LOCAL_PLAN_PATHS", self.path("plans.json")),
            ("ESIM_CATALOG_PARTNER_FEED_PATH", self.path("partner_plans.json")),
            ("ESIM_PARTNER_METADATA_PATH", self.path("partner_metadata.json")),
        ]
    }
}

#[test]
fn stats_reports_merged_catalog_counts() {
    let fixture = Fixture::new(true);
    with_env(&fixture.env(), || {
        let result = stats::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0, "expected stats success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "stats");
        assert_eq!(payload["status"], "ok");

        let statistics = &payload["data"]["statistics"];
        assert_eq!(statistics["totalPlans"], 3);
        assert_eq!(statistics["localPlans"], 2);
        assert_eq!(statistics["thirdPartyPlans"], 1);
        assert_eq!(statistics["countriesCovered"], 5);

        let aggregation = &payload["data"]["aggregation"];
        assert_eq!(aggregation["skipped"].as_array().map(Vec::len), Some(1));
    });
}

#[test]
fn stats_survives_a_missing_partner_feed() {
    let fixture = Fixture::new(false);
    with_env(&fixture.env(), || {
        let result = stats::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["statistics"]["totalPlans"], 2);
        assert_eq!(payload["data"]["aggregation"]["partner"]["status"], "unavailable");
    });
}

#[test]
fn stats_rejects_invalid_configuration() {
    let fixture = Fixture::new(true);
    let mut vars = fixture.env();
    vars.push(("ESIM_CATALOG_CACHE_TTL_SECS", "not-a-number".to_string()));
    with_env(&vars, || {
        let result = stats::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn coverage_lists_gaps_with_dedicated_exit_code() {
    let fixture = Fixture::new(true);
    with_env(&fixture.env(), || {
        let result = coverage::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 3, "expected coverage gap exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "coverage");
        assert_eq!(payload["error_class"], "coverage_gaps");

        let missing_countries = payload["data"]["missingCountries"].as_array().expect("array");
        assert!(missing_countries.iter().any(|entry| entry == "Germany (DE)"));
        assert!(!missing_countries.iter().any(|entry| entry == "Bulgaria (BG)"));

        let missing_regions = payload["data"]["missingRegions"].as_array().expect("array");
        assert!(missing_regions.iter().any(|entry| entry == "south-america"));
        assert!(!missing_regions.iter().any(|entry| entry == "north-america"));
    });
}

#[test]
fn refresh_is_reported_as_disabled_by_default() {
    let fixture = Fixture::new(true);
    with_env(&fixture.env(), || {
        let result = refresh::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "refresh");
        assert_eq!(payload["error_class"], "refresh_disabled");
    });
}

#[test]
fn refresh_failure_keeps_feed_and_records_metadata() {
    let fixture = Fixture::new(true);
    let mut vars = fixture.env();
    vars.push(("ESIM_PARTNER_ENABLED", "true".to_string()));
    vars.push(("ESIM_PARTNER_API_URL", "http://127.0.0.1:9/v2/partners/plans".to_string()));
    vars.push(("ESIM_PARTNER_API_KEY", "0123456789abcdef".to_string()));
    vars.push(("ESIM_PARTNER_TIMEOUT_SECS", "2".to_string()));
    with_env(&vars, || {
        let result = refresh::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "refresh_failed");

        let feed = fs::read_to_string(fixture.path("partner_plans.json")).expect("feed kept");
        assert_eq!(feed, PARTNER_FEED);

        let metadata = read_json(Path::new(&fixture.path("partner_metadata.json")));
        assert_eq!(metadata["status"], "error");
        assert_eq!(metadata["updateCount"], 1);
    });
}

#[test]
fn doctor_passes_with_readable_catalog() {
    let fixture = Fixture::new(true);
    with_env(&fixture.env(), || {
        let result = doctor::run(&LoadOptions::default(), true);
        assert_eq!(result.exit_code, 0, "expected doctor success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks");
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[2]["name"], "partner_feed");
        assert_eq!(checks[2]["status"], "pass");
    });
}

#[test]
fn doctor_fails_when_enabled_feed_is_missing() {
    let fixture = Fixture::new(false);
    let mut vars = fixture.env();
    vars.push(("ESIM_PARTNER_ENABLED", "true".to_string()));
    vars.push((
        "ESIM_PARTNER_API_URL",
        "https://partner.example.com/v2/partners/plans".to_string(),
    ));
    vars.push(("ESIM_PARTNER_API_KEY", "0123456789abcdef".to_string()));
    with_env(&vars, || {
        let result = doctor::run(&LoadOptions::default(), true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "pass");
        assert_eq!(payload["checks"][2]["status"], "fail");
    });
}

#[test]
fn doctor_human_output_marks_skipped_partner_feed() {
    let fixture = Fixture::new(false);
    with_env(&fixture.env(), || {
        let result = doctor::run(&LoadOptions::default(), false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("doctor: all readiness checks passed"));
        assert!(result.output.contains("- [skip] partner_feed"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("file should exist");
    serde_json::from_str(&raw).expect("file should be valid JSON")
}

fn with_env(vars: &[(&str, String)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "ESIM_CATALOG_LOCAL_PLAN_PATHS",
        "ESIM_CATALOG_PARTNER_FEED_PATH",
        "ESIM_CATALOG_CACHE_TTL_SECS",
        "ESIM_PARTNER_ENABLED",
        "ESIM_PARTNER_API_URL",
        "ESIM_PARTNER_API_KEY",
        "ESIM_PARTNER_ID",
        "ESIM_PARTNER_METADATA_PATH",
        "ESIM_PARTNER_TIMEOUT_SECS",
        "ESIM_PARTNER_MAX_AGE_DAYS",
        "ESIM_CHECKOUT_BASE_URL",
        "ESIM_CHECKOUT_AFFILIATE_BASE_URL",
        "ESIM_CHECKOUT_DEFAULT_LOCALE",
        "ESIM_SERVER_BIND_ADDRESS",
        "ESIM_SERVER_PORT",
        "ESIM_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "ESIM_LOGGING_LEVEL",
        "ESIM_LOGGING_FORMAT",
        "ESIM_LOG_LEVEL",
        "ESIM_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
