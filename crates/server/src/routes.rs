use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use kfzroute_agent::RouterRuntime;
use tower_http::trace::TraceLayer;

use crate::{completions, cors, health};

#[derive(Clone)]
pub struct AppState {
    pub runtime: RouterRuntime,
    pub store_configured: bool,
    pub llm_configured: bool,
}

/// CORS sits outside the preflight short-circuit so `OPTIONS` answers carry
/// the same headers as every other response.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat/completions", post(completions::chat_completions))
        .route("/health", get(health::health))
        .layer(middleware::from_fn(cors::answer_options))
        .layer(cors::allow_methods_header())
        .layer(cors::allow_headers_header())
        .layer(cors::layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use kfzroute_agent::{RouterRuntime, ScriptedLanguageModel};
    use kfzroute_store::InMemoryDataStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, AppState};

    pub(crate) fn state(store: InMemoryDataStore, llm: ScriptedLanguageModel) -> AppState {
        AppState {
            runtime: RouterRuntime::new(Arc::new(store), Arc::new(llm)),
            store_configured: true,
            llm_configured: true,
        }
    }

    pub(crate) async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_is_routed_with_cors_headers() {
        let app = router(state(InMemoryDataStore::new(), ScriptedLanguageModel::new()));

        let response = app
            .oneshot(
                Request::get("/health")
                    .header("origin", "https://portal.example")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization, X-Requested-With"
        );
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = router(state(InMemoryDataStore::new(), ScriptedLanguageModel::new()));

        let response = app
            .oneshot(Request::get("/v1/models").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_request_through_the_router() {
        let store = InMemoryDataStore::new()
            .with_rows("intent_index", vec![json!({"slug": "x", "aktiv": true})])
            .with_rows(
                "kfz_vorgaenge",
                vec![json!({"slug": "x", "titel": "T", "inhalt": "I", "aktiv": true})],
            );
        let app = router(state(store, ScriptedLanguageModel::new().reply("x")));

        let response = app
            .oneshot(
                Request::post("/chat/completions")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"messages": [{"role": "user", "content": "Frage"}], "mode": "data"})
                            .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let payload = body_json(response).await;
        let content: Value = serde_json::from_str(
            payload["choices"][0]["message"]["content"].as_str().expect("content"),
        )
        .expect("content is JSON");
        assert_eq!(content["intent"], "x");
        assert_eq!(content["data"]["titel"], "T");
        assert_eq!(content["needs_clarification"], false);
    }
}
