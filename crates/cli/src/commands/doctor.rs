use std::sync::Arc;

use anyhow::Context;
use kfzroute_core::config::{AppConfig, ConfigError, LoadOptions};
use kfzroute_store::{DataStore, QueryFilters, RestDataStore, INTENT_INDEX_TABLE};
use serde::Serialize;

use super::CommandResult;

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

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report(AppConfig::load(LoadOptions::default()));
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult::text(exit_code, output);
    }

    CommandResult::text(exit_code, render_human(&report))
}

fn build_report(loaded: Result<AppConfig, ConfigError>) -> DoctorReport {
    let mut checks = Vec::new();

    match loaded {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_store_configured(&config));
            checks.push(check_llm_configured(&config));
            checks.push(check_store_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["store_configured", "llm_configured", "store_reachability"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_store_configured(config: &AppConfig) -> DoctorCheck {
    if config.store.is_configured() {
        let key_note = if config.store.service_key.is_some() {
            "service key present"
        } else {
            "service key missing; requests will be rejected"
        };
        return DoctorCheck {
            name: "store_configured",
            status: CheckStatus::Pass,
            details: format!("store url set ({key_note})"),
        };
    }

    DoctorCheck {
        name: "store_configured",
        status: CheckStatus::Fail,
        details: "set KFZROUTE_STORE_URL or SUPABASE_URL".to_string(),
    }
}

fn check_llm_configured(config: &AppConfig) -> DoctorCheck {
    if config.llm.is_configured() {
        return DoctorCheck {
            name: "llm_configured",
            status: CheckStatus::Pass,
            details: format!("api key present for model `{}`", config.llm.model),
        };
    }

    DoctorCheck {
        name: "llm_configured",
        status: CheckStatus::Fail,
        details: "set KFZROUTE_LLM_API_KEY or OPENAI_API_KEY".to_string(),
    }
}

fn check_store_reachability(config: &AppConfig) -> DoctorCheck {
    if !config.store.is_configured() {
        return DoctorCheck {
            name: "store_reachability",
            status: CheckStatus::Skipped,
            details: "skipped because no store url is configured".to_string(),
        };
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "store_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    match runtime.block_on(query_intent_index(config)) {
        Ok(rows) => DoctorCheck {
            name: "store_reachability",
            status: CheckStatus::Pass,
            details: format!("`{INTENT_INDEX_TABLE}` answered with {rows} row(s)"),
        },
        Err(error) => DoctorCheck {
            name: "store_reachability",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

async fn query_intent_index(config: &AppConfig) -> anyhow::Result<usize> {
    let store: Arc<dyn DataStore> = Arc::new(
        RestDataStore::from_config(&config.store).context("failed to build data store client")?,
    );
    let rows = store
        .query(INTENT_INDEX_TABLE, &QueryFilters::new().select("slug").limit(1))
        .await
        .with_context(|| format!("failed to query `{INTENT_INDEX_TABLE}`"))?;
    Ok(rows.len())
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
