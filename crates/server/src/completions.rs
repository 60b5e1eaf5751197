use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kfzroute_agent::Reply;
use kfzroute_core::InterfaceError;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::routes::AppState;

pub const INVALID_JSON: &str = "Invalid request: body must be valid JSON";
pub const INVALID_CONTENT_TYPE: &str = "Invalid request: Content-Type must be application/json";

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

pub async fn chat_completions(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(
                event_name = "http.chat_completions.rejected",
                reason = %rejection.body_text(),
                "request body could not be parsed"
            );
            let message = match rejection {
                JsonRejection::MissingJsonContentType(_) => INVALID_CONTENT_TYPE,
                _ => INVALID_JSON,
            };
            let error = InterfaceError::BadRequest {
                message: message.to_string(),
                correlation_id: "unassigned".to_string(),
            };
            return error_response(StatusCode::BAD_REQUEST, &error);
        }
    };

    let run = state.runtime.handle(&body).await;
    let status =
        StatusCode::from_u16(run.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match run.reply {
        Reply::Completion(response) => (status, Json(response)).into_response(),
        Reply::Failure(error) => error_response(status, &error),
    }
}

fn error_response(status: StatusCode, error: &InterfaceError) -> Response {
    let envelope =
        ErrorEnvelope { error: ErrorBody { message: error.message(), kind: error.error_type() } };
    (status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use kfzroute_agent::ScriptedLanguageModel;
    use kfzroute_core::domain::chat::{CLARIFICATION_REPLY, INVALID_MESSAGES, NO_USER_MESSAGE};
    use kfzroute_store::InMemoryDataStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{INVALID_CONTENT_TYPE, INVALID_JSON};
    use crate::routes::router;
    use crate::routes::tests::{body_json, state};

    fn post(body: impl Into<Body>) -> Request<Body> {
        Request::post("/chat/completions")
            .header("content-type", "application/json")
            .body(body.into())
            .expect("request")
    }

    fn catalog() -> InMemoryDataStore {
        InMemoryDataStore::new()
            .with_rows(
                "intent_index",
                vec![json!({"slug": "ummeldung_dauer", "intent_group": "ummeldung", "aktiv": true})],
            )
            .with_rows(
                "kfz_vorgaenge",
                vec![json!({
                    "slug": "ummeldung_dauer",
                    "titel": "Dauer einer Ummeldung",
                    "inhalt": "Rund 15 Minuten vor Ort.",
                    "aktiv": true
                })],
            )
    }

    async fn send(app_state: crate::routes::AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(app_state).oneshot(request).await.expect("response");
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn answer_request_returns_completion_envelope() {
        let llm = ScriptedLanguageModel::new()
            .reply("ummeldung_dauer")
            .reply("Eine Ummeldung dauert etwa 15 Minuten.");
        let body = json!({"messages": [{"role": "user", "content": "Wie lange dauert eine Ummeldung?"}]});

        let (status, payload) = send(state(catalog(), llm), post(body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["object"], "chat.completion");
        assert!(payload["id"].as_str().expect("id").starts_with("chatcmpl-"));
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["choices"][0]["index"], 0);
        assert_eq!(payload["choices"][0]["message"]["role"], "assistant");
        assert_eq!(
            payload["choices"][0]["message"]["content"],
            "Eine Ummeldung dauert etwa 15 Minuten."
        );
        assert_eq!(payload["choices"][0]["finish_reason"], "stop");
        assert_eq!(payload["usage"]["total_tokens"], 150);
    }

    #[tokio::test]
    async fn unknown_intent_returns_clarification() {
        let body = json!({"messages": [{"role": "user", "content": "Hallo"}]});

        let (status, payload) =
            send(state(catalog(), ScriptedLanguageModel::new().reply("unknown")), post(body.to_string()))
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["choices"][0]["message"]["content"], CLARIFICATION_REPLY);
        assert_eq!(payload["usage"], json!({"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0}));
    }

    #[tokio::test]
    async fn messages_must_be_an_array() {
        let (status, payload) = send(
            state(catalog(), ScriptedLanguageModel::new()),
            post(json!({"messages": "hallo"}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            payload,
            json!({"error": {"message": INVALID_MESSAGES, "type": "invalid_request_error"}})
        );
    }

    #[tokio::test]
    async fn conversation_without_user_turn_is_rejected() {
        let body = json!({"messages": [{"role": "system", "content": "Sei nett."}]});

        let (status, payload) =
            send(state(catalog(), ScriptedLanguageModel::new()), post(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"]["message"], NO_USER_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, payload) =
            send(state(catalog(), ScriptedLanguageModel::new()), post("{\"messages\": [")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"]["message"], INVALID_JSON);
        assert_eq!(payload["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn json_without_content_type_names_the_header() {
        let body = json!({"messages": [{"role": "user", "content": "Hallo"}]});
        let request =
            Request::post("/chat/completions").body(Body::from(body.to_string())).expect("request");

        let (status, payload) = send(state(catalog(), ScriptedLanguageModel::new()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            payload,
            json!({"error": {"message": INVALID_CONTENT_TYPE, "type": "invalid_request_error"}})
        );
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_internal_error() {
        let store = InMemoryDataStore::new().with_failure("intent_index", "401 Unauthorized");
        let body = json!({"messages": [{"role": "user", "content": "Frage"}]});

        let (status, payload) =
            send(state(store, ScriptedLanguageModel::new()), post(body.to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            payload,
            json!({"error": {
                "message": "data store query failed: 401 Unauthorized",
                "type": "internal_error"
            }})
        );
    }
}
