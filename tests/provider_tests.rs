//! HTTP provider tests
//!
//! These tests use wiremock to stand in for the chat completions and Exa
//! search APIs and validate request shape, response parsing and error
//! handling.

use multiscout::llm::{CompletionOptions, LLMClient, OpenAICompatClient};
use multiscout::search::{ExaSearch, SearchProvider};
use multiscout::types::AppError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

fn chat_response(content: Option<&str>) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn chat_client(server: &MockServer) -> OpenAICompatClient {
    OpenAICompatClient::new(
        format!("{}/v1/", server.uri()),
        Some("test-key".to_string()),
        "gpt-oss-120b".to_string(),
    )
    .unwrap()
}

// ============= Chat Completion Tests =============

#[tokio::test]
async fn test_chat_completion_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-oss-120b",
            "max_tokens": 1500,
            "messages": [{ "role": "user", "content": "plan this" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(Some("a plan"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = chat_client(&mock_server);
    let text = client
        .complete("plan this", &CompletionOptions::new(1500, 0.2))
        .await
        .unwrap();

    assert_eq!(text, "a plan");
    assert_eq!(client.model_name(), "gpt-oss-120b");
}

#[tokio::test]
async fn test_chat_completion_model_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": "llama-3.3-70b" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(Some("ok"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = CompletionOptions::default().with_model(Some("llama-3.3-70b".to_string()));
    let text = chat_client(&mock_server)
        .complete("hi", &options)
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_chat_completion_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let err = chat_client(&mock_server).generate("hi").await.unwrap_err();
    match err {
        AppError::LLM(msg) => {
            assert!(msg.contains("429"));
            assert!(msg.contains("rate limited"));
        }
        other => panic!("expected LLM error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_completion_empty_content_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(None)))
        .mount(&mock_server)
        .await;

    let err = chat_client(&mock_server).generate("hi").await.unwrap_err();
    assert!(matches!(err, AppError::LLM(_)));
}

// ============= Exa Search Tests =============

#[tokio::test]
async fn test_exa_search_request_and_parsing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "exa-key"))
        .and(body_partial_json(json!({
            "query": "solid state batteries",
            "type": "auto",
            "numResults": 2,
            "contents": { "text": { "maxCharacters": 1000 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "title": "Battery breakthrough",
                    "url": "https://news.example/battery",
                    "text": "Solid state cells replace the liquid electrolyte."
                },
                { "url": "" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exa = ExaSearch::new(mock_server.uri(), "exa-key").unwrap();
    let items = exa.search("solid state batteries", 2).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Battery breakthrough");
    assert_eq!(items[0].url.as_deref(), Some("https://news.example/battery"));
    assert!(items[0].text.starts_with("Solid state"));
    assert_eq!(items[1].title, "");
    assert_eq!(items[1].text, "");
    assert_eq!(items[1].url, None);
    assert_eq!(exa.name(), "exa");
}

#[tokio::test]
async fn test_exa_search_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let exa = ExaSearch::new(mock_server.uri(), "bad-key").unwrap();
    let err = exa.search("anything", 3).await.unwrap_err();
    assert!(matches!(err, AppError::Search(msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_exa_search_invalid_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let exa = ExaSearch::new(mock_server.uri(), "exa-key").unwrap();
    let err = exa.search("anything", 3).await.unwrap_err();
    assert!(matches!(err, AppError::Search(_)));
}
