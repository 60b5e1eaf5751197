use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

/// Flags report configuration presence only; no remote call is made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub supabase: bool,
    pub openai: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        supabase: state.store_configured,
        openai: state.llm_configured,
    })
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, Json};
    use chrono::DateTime;
    use kfzroute_agent::ScriptedLanguageModel;
    use kfzroute_store::InMemoryDataStore;

    use crate::health::health;
    use crate::routes::tests::state;

    #[tokio::test]
    async fn health_reports_configuration_presence() {
        let mut app_state = state(InMemoryDataStore::new(), ScriptedLanguageModel::new());
        app_state.llm_configured = false;

        let Json(payload) = health(State(app_state)).await;

        assert_eq!(payload.status, "ok");
        assert!(payload.supabase);
        assert!(!payload.openai);
        assert!(DateTime::parse_from_rfc3339(&payload.timestamp).is_ok());
    }

    #[tokio::test]
    async fn health_serializes_in_wire_order() {
        let Json(payload) =
            health(State(state(InMemoryDataStore::new(), ScriptedLanguageModel::new()))).await;

        let body = serde_json::to_string(&payload).expect("serialize");

        assert!(body.starts_with("{\"status\":\"ok\",\"timestamp\":"));
        assert!(body.ends_with(",\"supabase\":true,\"openai\":true}"));
    }
}
