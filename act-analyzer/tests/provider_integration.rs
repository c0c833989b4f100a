use act_analyzer::load_config::ProviderSection;
use act_analyzer::provider::OpenAiClient;
use act_analyzer_core::contract::LlmProvider;
use act_analyzer_core::error::ProviderError;
use act_analyzer_core::prompts::AnalysisTask;
use act_analyzer_core::source::DocumentText;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

/// Serves `app` on an ephemeral port and returns its `/v1` base URL.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake provider");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn client(base_url: String) -> OpenAiClient {
    let settings = ProviderSection {
        base_url,
        timeout_secs: 5,
        ..ProviderSection::default()
    };
    OpenAiClient::new(&settings, "sk-test-key").unwrap()
}

fn document() -> DocumentText {
    DocumentText::new("Records must be kept for 5 years.")
}

async fn chat_ok(
    State(state): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push((auth, body));
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": "- Keeps records" } }]
    }))
}

#[tokio::test]
async fn test_complete_sends_bearer_auth_and_returns_first_choice_content() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_ok))
        .with_state(captured.clone());
    let provider = client(spawn_server(app).await);

    let request = AnalysisTask::ExtractSections.build_request(&document());
    let content = provider.complete(request).await.expect("completion");

    assert_eq!(content, "- Keeps records");
    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test-key"));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("Records must be kept for 5 years."));
    assert_eq!(
        body["response_format"]["json_schema"]["name"],
        "legislative_sections"
    );
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
}

fn failing_app(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(
        "/v1/chat/completions",
        post(move || async move { (status, body).into_response() }),
    )
}

#[tokio::test]
async fn test_unauthorized_status_maps_to_unauthorized() {
    let provider = client(
        spawn_server(failing_app(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":"invalid_api_key"}}"#,
        ))
        .await,
    );

    let err = provider
        .complete(AnalysisTask::Summarize.build_request(&document()))
        .await
        .unwrap_err();
    match err {
        ProviderError::Unauthorized { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid_api_key"));
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_status_maps_to_quota_exceeded() {
    let provider = client(
        spawn_server(failing_app(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":"insufficient_quota"}}"#,
        ))
        .await,
    );

    let err = provider
        .complete(AnalysisTask::CheckRules.build_request(&document()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::QuotaExceeded(ref b) if b.contains("insufficient_quota")));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let provider = client(
        spawn_server(failing_app(StatusCode::BAD_GATEWAY, "upstream unavailable")).await,
    );

    let err = provider
        .complete(AnalysisTask::Summarize.build_request(&document()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProviderError::Api {
            status: 502,
            body: "upstream unavailable".into()
        }
    );
}

#[tokio::test]
async fn test_null_content_is_empty_response() {
    async fn null_content() -> Response {
        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] }))
            .into_response()
    }
    let app = Router::new().route("/v1/chat/completions", post(null_content));
    let provider = client(spawn_server(app).await);

    let err = provider
        .complete(AnalysisTask::Summarize.build_request(&document()))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::EmptyResponse);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let provider = client(format!("http://{addr}/v1"));

    let err = provider
        .complete(AnalysisTask::Summarize.build_request(&document()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)), "got {err:?}");
}
