use chrono::Utc;
use esim_catalog_core::catalog::source::PlanSource;
use esim_catalog_core::config::{AppConfig, LoadOptions};
use esim_catalog_sources::metadata::{feed_file_status, needs_refresh, read_metadata, FeedStatus};
use esim_catalog_sources::wiring::{local_source, partner_source};
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::commands::{command_runtime, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match command_runtime("doctor") {
                Ok(runtime) => {
                    checks.push(check_local_catalog(&runtime, &config));
                    checks.push(check_partner_feed(&runtime, &config));
                }
                Err(_) => {
                    checks.push(failed_runtime("local_catalog"));
                    checks.push(failed_runtime("partner_feed"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("local_catalog"));
            checks.push(skipped("partner_feed"));
        }
    }

    let all_ok = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_ok { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ok {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_local_catalog(runtime: &Runtime, config: &AppConfig) -> DoctorCheck {
    let source = local_source(config);
    let result = runtime.block_on(async {
        let path = source.resolve().await;
        source.fetch_items().await.map(|items| (path, items.len()))
    });

    match result {
        Ok((path, records)) => DoctorCheck {
            name: "local_catalog",
            status: CheckStatus::Pass,
            details: format!(
                "read {records} plan records from `{}`",
                path.map(|path| path.display().to_string()).unwrap_or_default()
            ),
        },
        Err(error) => DoctorCheck {
            name: "local_catalog",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_partner_feed(runtime: &Runtime, config: &AppConfig) -> DoctorCheck {
    let feed_path = config.catalog.partner_feed_path.clone();
    let (status, metadata, records) = runtime.block_on(async {
        let status = feed_file_status(&feed_path).await;
        let metadata = read_metadata(&config.partner.metadata_path).await;
        let records = partner_source(config).fetch_items().await.map(|items| items.len());
        (status, metadata, records)
    });

    if !status.exists {
        return if config.partner.enabled {
            DoctorCheck {
                name: "partner_feed",
                status: CheckStatus::Fail,
                details: format!(
                    "feed file `{}` is missing; run `esim refresh`",
                    feed_path.display()
                ),
            }
        } else {
            DoctorCheck {
                name: "partner_feed",
                status: CheckStatus::Skipped,
                details: "partner feed disabled and no feed file present".to_string(),
            }
        };
    }

    let records = match records {
        Ok(records) => records,
        Err(error) => {
            return DoctorCheck {
                name: "partner_feed",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    if !config.partner.enabled {
        return DoctorCheck {
            name: "partner_feed",
            status: CheckStatus::Pass,
            details: format!("static feed with {records} records (refresh disabled)"),
        };
    }

    if needs_refresh(&status, metadata.as_ref(), Utc::now(), config.partner.max_age()) {
        let reason = match &metadata {
            None => "metadata is missing".to_string(),
            Some(metadata) if metadata.status == FeedStatus::Error => format!(
                "last refresh failed: {}",
                metadata.last_error.as_deref().unwrap_or("unknown error")
            ),
            Some(_) => format!("feed is older than {} days", config.partner.max_age_days),
        };
        return DoctorCheck {
            name: "partner_feed",
            status: CheckStatus::Fail,
            details: format!("{reason}; run `esim refresh`"),
        };
    }

    DoctorCheck {
        name: "partner_feed",
        status: CheckStatus::Pass,
        details: format!(
            "{records} records, next update {}",
            metadata
                .map(|metadata| metadata.next_update.to_rfc3339())
                .unwrap_or_else(|| "<unknown>".to_string())
        ),
    }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn failed_runtime(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Fail,
        details: "failed to initialize async runtime".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
