//! Exercises `ClaudeProvider` against a local stand-in for the Messages API.

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use inkhaven_core::{CoreError, LlmError};
use llm_interface::{ClaudeProvider, LlmProvider};
use serde_json::{json, Value};

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1/messages", addr)
}

fn provider(base_url: String) -> ClaudeProvider {
    ClaudeProvider::new("sk-test".to_string(), "test-model".to_string(), 150)
        .unwrap()
        .with_base_url(base_url)
}

async fn messages_ok(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("sk-test")
        || headers.get("anthropic-version").is_none()
    {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }

    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    let reply = if prompt.contains("Title: Proofs") {
        "mathematics, philosophy"
    } else {
        "personal"
    };

    (
        StatusCode::OK,
        Json(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": body["model"],
            "content": [{"type": "text", "text": reply}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 3}
        })),
    )
}

#[tokio::test]
async fn test_classify_returns_reply_text() {
    let url = spawn_server(Router::new().route("/v1/messages", post(messages_ok))).await;
    let reply = provider(url).classify("Title: Proofs and Refutations").await.unwrap();
    assert_eq!(reply, "mathematics, philosophy");
}

#[tokio::test]
async fn test_rate_limit_maps_to_llm_error() {
    let router = Router::new().route(
        "/v1/messages",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("retry-after", "7")],
                "slow down",
            )
        }),
    );
    let url = spawn_server(router).await;

    let error = provider(url).classify("anything").await.unwrap_err();
    assert!(matches!(
        error,
        CoreError::Llm(LlmError::RateLimitExceeded { retry_after: 7, .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_error() {
    let router = Router::new().route("/v1/messages", post(|| async { "not json" }));
    let url = spawn_server(router).await;

    let error = provider(url).classify("anything").await.unwrap_err();
    assert!(matches!(
        error,
        CoreError::Llm(LlmError::InvalidResponseFormat { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let error = provider(format!("http://{}/v1/messages", addr))
        .classify("anything")
        .await
        .unwrap_err();
    assert!(matches!(error, CoreError::Network(_)));
}
