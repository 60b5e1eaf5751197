use std::env;
use std::sync::{Mutex, OnceLock};

use kfzroute_cli::commands::{config, doctor};
use serde_json::Value;

#[test]
fn config_lists_effective_values_with_sources() {
    with_env(
        &[
            ("SUPABASE_URL", "https://projekt.supabase.co"),
            ("KFZROUTE_LLM_API_KEY", "sk-geheim-123"),
            ("PORT", "8080"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0, "expected config listing");

            let output = &result.output;
            assert!(output.contains(
                "- store.url = https://projekt.supabase.co (source: env (SUPABASE_URL))"
            ));
            assert!(output.contains("- llm.api_key = sk-*** (source: env (KFZROUTE_LLM_API_KEY))"));
            assert!(output.contains("- server.port = 8080 (source: env (PORT))"));
            assert!(output.contains("- llm.model = gpt-4o-mini (source: default)"));
            assert!(!output.contains("geheim"), "secret must never be printed");
        },
    );
}

#[test]
fn blank_env_values_fall_back_to_default_source() {
    with_env(&[("SUPABASE_URL", "   "), ("PORT", "")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0, "blank values are ignored, not rejected");

        let output = &result.output;
        assert!(output.contains("- store.url = <unset> (source: default)"));
        assert!(output.contains("- server.port = 3000 (source: default)"));
        assert!(!output.contains("env (SUPABASE_URL)"));
    });
}

#[test]
fn config_reports_validation_failure_as_json() {
    with_env(&[("KFZROUTE_STORE_URL", "ftp://falsch")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_json_fails_without_credentials() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");

        let checks = payload["checks"].as_array().expect("checks array");
        let status_of = |name: &str| {
            checks
                .iter()
                .find(|check| check["name"] == name)
                .map(|check| check["status"].clone())
                .unwrap_or(Value::Null)
        };
        assert_eq!(status_of("config_validation"), "pass");
        assert_eq!(status_of("store_configured"), "fail");
        assert_eq!(status_of("llm_configured"), "fail");
        assert_eq!(status_of("store_reachability"), "skipped");
    });
}

#[test]
fn doctor_reports_unreachable_store() {
    with_env(
        &[
            ("KFZROUTE_STORE_URL", "http://127.0.0.1:9"),
            ("KFZROUTE_STORE_TIMEOUT_SECS", "2"),
            ("KFZROUTE_LLM_API_KEY", "sk-test"),
        ],
        || {
            let result = doctor::run(false);
            assert_eq!(result.exit_code, 1);
            assert!(result.output.contains("- [ok] store_configured"));
            assert!(result.output.contains("- [ok] llm_configured"));
            assert!(result.output.contains("- [fail] store_reachability: failed to query `intent_index`"));
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "KFZROUTE_STORE_URL",
        "KFZROUTE_STORE_SERVICE_KEY",
        "KFZROUTE_STORE_TIMEOUT_SECS",
        "KFZROUTE_LLM_API_KEY",
        "KFZROUTE_LLM_BASE_URL",
        "KFZROUTE_LLM_MODEL",
        "KFZROUTE_LLM_TIMEOUT_SECS",
        "KFZROUTE_SERVER_BIND_ADDRESS",
        "KFZROUTE_SERVER_PORT",
        "KFZROUTE_LOGGING_LEVEL",
        "KFZROUTE_LOGGING_FORMAT",
        "KFZROUTE_LOG_LEVEL",
        "KFZROUTE_LOG_FORMAT",
        "SUPABASE_URL",
        "SUPABASE_SERVICE_KEY",
        "OPENAI_API_KEY",
        "PORT",
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
